use sea_orm::*;
use tracing::info;

use crate::entity::contact_info;

/// Insert a placeholder contact-info row when the table is empty.
///
/// The contact page renders this singleton; the real values are edited
/// directly in the database by whoever runs the site.
pub async fn ensure_contact_info(db: &DatabaseConnection) -> Result<(), DbErr> {
    let existing = contact_info::Entity::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    let model = contact_info::ActiveModel {
        address: Set("Not configured".to_string()),
        phone: Set(String::new()),
        email: Set(String::new()),
        facebook: Set(String::new()),
        twitter: Set(String::new()),
        instagram: Set(String::new()),
        youtube: Set(String::new()),
        map_embed: Set(None),
        ..Default::default()
    };
    model.insert(db).await?;

    info!("Seeded placeholder contact info");
    Ok(())
}
