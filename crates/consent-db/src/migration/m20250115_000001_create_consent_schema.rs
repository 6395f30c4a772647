use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Consent aggregate root
        manager
            .create_table(
                Table::create()
                    .table(Consent::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Consent::ConsentId).string_len(255).not_null())
                    .col(ColumnDef::new(Consent::OrgId).string_len(255).not_null())
                    .col(ColumnDef::new(Consent::ClientId).string_len(255).not_null())
                    .col(ColumnDef::new(Consent::ConsentType).string_len(255).not_null())
                    .col(ColumnDef::new(Consent::CurrentStatus).string_len(64).not_null())
                    .col(ColumnDef::new(Consent::ConsentFrequency).integer())
                    .col(ColumnDef::new(Consent::ValidityTime).big_integer())
                    .col(ColumnDef::new(Consent::RecurringIndicator).boolean())
                    .col(ColumnDef::new(Consent::DataAccessValidityDuration).big_integer())
                    .col(ColumnDef::new(Consent::Receipt).text())
                    .col(ColumnDef::new(Consent::CreatedTime).big_integer().not_null())
                    .col(ColumnDef::new(Consent::UpdatedTime).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Consent::ConsentId)
                            .col(Consent::OrgId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consent_org_status")
                    .table(Consent::Table)
                    .col(Consent::OrgId)
                    .col(Consent::CurrentStatus)
                    .to_owned(),
            )
            .await?;

        // Consent attributes
        manager
            .create_table(
                Table::create()
                    .table(ConsentAttribute::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentAttribute::ConsentId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAttribute::OrgId).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ConsentAttribute::AttrKey)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAttribute::AttrValue).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(ConsentAttribute::ConsentId)
                            .col(ConsentAttribute::OrgId)
                            .col(ConsentAttribute::AttrKey),
                    )
                    .to_owned(),
            )
            .await?;

        // Purpose catalog
        manager
            .create_table(
                Table::create()
                    .table(ConsentPurpose::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentPurpose::PurposeId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentPurpose::OrgId).string_len(255).not_null())
                    .col(ColumnDef::new(ConsentPurpose::Name).string_len(255).not_null())
                    .col(ColumnDef::new(ConsentPurpose::Description).text())
                    .col(ColumnDef::new(ConsentPurpose::PurposeType).string_len(255))
                    .col(ColumnDef::new(ConsentPurpose::Attributes).json())
                    .primary_key(
                        Index::create()
                            .col(ConsentPurpose::PurposeId)
                            .col(ConsentPurpose::OrgId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purpose_org_name")
                    .table(ConsentPurpose::Table)
                    .col(ConsentPurpose::OrgId)
                    .col(ConsentPurpose::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Consent/purpose mappings
        manager
            .create_table(
                Table::create()
                    .table(ConsentPurposeMapping::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::MappingId)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::ConsentId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::OrgId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::PurposeId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::PurposeName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentPurposeMapping::PurposeValue).text())
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::IsUserApproved)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeMapping::IsMandatory)
                            .boolean()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mapping_consent")
                    .table(ConsentPurposeMapping::Table)
                    .col(ConsentPurposeMapping::ConsentId)
                    .col(ConsentPurposeMapping::OrgId)
                    .to_owned(),
            )
            .await?;

        // Authorization resources
        manager
            .create_table(
                Table::create()
                    .table(ConsentAuthResource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentAuthResource::AuthId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentAuthResource::OrgId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentAuthResource::ConsentId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentAuthResource::AuthType)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAuthResource::UserId).string_len(255))
                    .col(
                        ColumnDef::new(ConsentAuthResource::AuthStatus)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAuthResource::Resources).text())
                    .col(
                        ColumnDef::new(ConsentAuthResource::UpdatedTime)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ConsentAuthResource::AuthId)
                            .col(ConsentAuthResource::OrgId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_consent")
                    .table(ConsentAuthResource::Table)
                    .col(ConsentAuthResource::ConsentId)
                    .col(ConsentAuthResource::OrgId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_user")
                    .table(ConsentAuthResource::Table)
                    .col(ConsentAuthResource::OrgId)
                    .col(ConsentAuthResource::UserId)
                    .to_owned(),
            )
            .await?;

        // Status audit trail
        manager
            .create_table(
                Table::create()
                    .table(ConsentStatusAudit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentStatusAudit::StatusAuditId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentStatusAudit::OrgId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentStatusAudit::ConsentId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentStatusAudit::PreviousStatus)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentStatusAudit::CurrentStatus)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentStatusAudit::ActionTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentStatusAudit::Reason).text().not_null())
                    .col(ColumnDef::new(ConsentStatusAudit::ActionBy).string_len(255))
                    .primary_key(
                        Index::create()
                            .col(ConsentStatusAudit::StatusAuditId)
                            .col(ConsentStatusAudit::OrgId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_consent_time")
                    .table(ConsentStatusAudit::Table)
                    .col(ConsentStatusAudit::ConsentId)
                    .col(ConsentStatusAudit::OrgId)
                    .col(ConsentStatusAudit::ActionTime)
                    .to_owned(),
            )
            .await?;

        // Consent file blobs (pass-through)
        manager
            .create_table(
                Table::create()
                    .table(ConsentFile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ConsentFile::ConsentId).string_len(255).not_null())
                    .col(ColumnDef::new(ConsentFile::OrgId).string_len(255).not_null())
                    .col(ColumnDef::new(ConsentFile::FileContent).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(ConsentFile::ConsentId)
                            .col(ConsentFile::OrgId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConsentFile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentStatusAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentAuthResource::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentPurposeMapping::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentPurpose::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentAttribute::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Consent::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Consent {
    Table,
    ConsentId,
    OrgId,
    ClientId,
    ConsentType,
    CurrentStatus,
    ConsentFrequency,
    ValidityTime,
    RecurringIndicator,
    DataAccessValidityDuration,
    Receipt,
    CreatedTime,
    UpdatedTime,
}

#[derive(Iden)]
enum ConsentAttribute {
    Table,
    ConsentId,
    OrgId,
    AttrKey,
    AttrValue,
}

#[derive(Iden)]
enum ConsentPurpose {
    Table,
    PurposeId,
    OrgId,
    Name,
    Description,
    PurposeType,
    Attributes,
}

#[derive(Iden)]
enum ConsentPurposeMapping {
    Table,
    MappingId,
    ConsentId,
    OrgId,
    PurposeId,
    PurposeName,
    PurposeValue,
    IsUserApproved,
    IsMandatory,
}

#[derive(Iden)]
enum ConsentAuthResource {
    Table,
    AuthId,
    OrgId,
    ConsentId,
    AuthType,
    UserId,
    AuthStatus,
    Resources,
    UpdatedTime,
}

#[derive(Iden)]
enum ConsentStatusAudit {
    Table,
    StatusAuditId,
    OrgId,
    ConsentId,
    PreviousStatus,
    CurrentStatus,
    ActionTime,
    Reason,
    ActionBy,
}

#[derive(Iden)]
enum ConsentFile {
    Table,
    ConsentId,
    OrgId,
    FileContent,
}
