use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Activities
    create_indexes(
        db,
        "activities",
        vec![
            index(bson::doc! { "owner_id": 1 }),
            index(bson::doc! { "date": 1 }),
            index(bson::doc! { "state": 1 }),
            index(bson::doc! { "status": 1 }),
            index(bson::doc! { "tags": 1 }),
            index(bson::doc! { "participants.user_id": 1 }),
        ],
    )
    .await?;

    // Attendance
    create_indexes(
        db,
        "attendance",
        vec![
            index_unique(bson::doc! { "activity_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
