use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(EmailStatus::Enum)
                    .values([EmailStatus::Pending, EmailStatus::Sent, EmailStatus::Failed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Emails::Table)
                    .if_not_exists()
                    .col(pk_uuid(Emails::Id))
                    .col(string_len(Emails::Recipient, 255))
                    .col(string_len(Emails::Subject, 500))
                    .col(text_null(Emails::Body))
                    .col(text_null(Emails::HtmlBody))
                    .col(
                        ColumnDef::new(Emails::Status)
                            .enumeration(
                                EmailStatus::Enum,
                                [EmailStatus::Pending, EmailStatus::Sent, EmailStatus::Failed],
                            )
                            .not_null()
                            .default("pending"),
                    )
                    .col(text_null(Emails::ErrorMessage))
                    .col(timestamp_with_time_zone_null(Emails::SentAt))
                    .col(
                        timestamp_with_time_zone(Emails::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Emails::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_emails_recipient")
                    .table(Emails::Table)
                    .col(Emails::Recipient)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_emails_status")
                    .table(Emails::Table)
                    .col(Emails::Status)
                    .to_owned(),
            )
            .await?;

        // Listing is ordered by (created_at, id)
        manager
            .create_index(
                Index::create()
                    .name("idx_emails_created_at_id")
                    .table(Emails::Table)
                    .col(Emails::CreatedAt)
                    .col(Emails::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER emails_touch_updated_at
                    BEFORE UPDATE ON emails
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS emails_touch_updated_at ON emails")
            .await?;

        manager
            .drop_table(Table::drop().table(Emails::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EmailStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Emails {
    Table,
    Id,
    Recipient,
    Subject,
    Body,
    HtmlBody,
    Status,
    ErrorMessage,
    SentAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmailStatus {
    #[sea_orm(iden = "email_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "sent")]
    Sent,
    #[sea_orm(iden = "failed")]
    Failed,
}
