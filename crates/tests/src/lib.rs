
#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod attendance_tests;
#[cfg(test)]
mod listing_tests;
