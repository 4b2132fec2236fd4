use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_medications_table::Migration),
            Box::new(m20240101_000002_create_health_units_table::Migration),
            Box::new(m20240101_000003_create_stock_lots_table::Migration),
            Box::new(m20240101_000004_create_reservations_table::Migration),
            Box::new(m20240101_000005_create_withdrawals_tables::Migration),
            Box::new(m20240101_000006_create_log_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_medications_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_medications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Medications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Medications::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Medications::CommercialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Medications::ActiveIngredient)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Medications::Concentration).string().null())
                        .col(ColumnDef::new(Medications::Presentation).string().null())
                        .col(
                            ColumnDef::new(Medications::AdministrationRoute)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Medications::Controlled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Medications::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Medications::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Medications {
        Table,
        Id,
        CommercialName,
        ActiveIngredient,
        Concentration,
        Presentation,
        AdministrationRoute,
        Controlled,
        Active,
    }
}

mod m20240101_000002_create_health_units_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_health_units_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(HealthUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(HealthUnits::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(HealthUnits::Name).string().not_null())
                        .col(ColumnDef::new(HealthUnits::Address).string().not_null())
                        .col(
                            ColumnDef::new(HealthUnits::Latitude)
                                .decimal_len(10, 7)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(HealthUnits::Longitude)
                                .decimal_len(10, 7)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(HealthUnits::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(HealthUnits::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum HealthUnits {
        Table,
        Id,
        Name,
        Address,
        Latitude,
        Longitude,
        Active,
    }
}

mod m20240101_000003_create_stock_lots_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_stock_lots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockLots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLots::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLots::MedicationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLots::UbsId).big_integer().not_null())
                        .col(ColumnDef::new(StockLots::LotCode).string().not_null())
                        .col(
                            ColumnDef::new(StockLots::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(StockLots::ExpiryDate).date().not_null())
                        .col(
                            ColumnDef::new(StockLots::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One lot code per (medication, ubs); duplicate inserts surface as 409.
            manager
                .create_index(
                    Index::create()
                        .name("uk_stock_lots_medication_ubs_lot")
                        .table(StockLots::Table)
                        .col(StockLots::MedicationId)
                        .col(StockLots::UbsId)
                        .col(StockLots::LotCode)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockLots::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockLots {
        Table,
        Id,
        MedicationId,
        UbsId,
        LotCode,
        Quantity,
        ExpiryDate,
        UpdatedAt,
    }
}

mod m20240101_000004_create_reservations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_reservations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservations::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::MedicationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::UbsId).big_integer().not_null())
                        .col(ColumnDef::new(Reservations::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Reservations::PickupTime)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::Status).string().not_null())
                        .col(
                            ColumnDef::new(Reservations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Availability sums filter on (medication, ubs, status).
            manager
                .create_index(
                    Index::create()
                        .name("ix_reservations_medication_ubs_status")
                        .table(Reservations::Table)
                        .col(Reservations::MedicationId)
                        .col(Reservations::UbsId)
                        .col(Reservations::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ix_reservations_user")
                        .table(Reservations::Table)
                        .col(Reservations::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reservations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Reservations {
        Table,
        Id,
        UserId,
        MedicationId,
        UbsId,
        Quantity,
        PickupTime,
        Status,
        CreatedAt,
    }
}

mod m20240101_000005_create_withdrawals_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_withdrawals_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Withdrawals::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Withdrawals::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Withdrawals::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Withdrawals::UbsId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Withdrawals::PharmacistId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Withdrawals::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WithdrawalItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WithdrawalItems::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WithdrawalItems::WithdrawalId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WithdrawalItems::MedicationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WithdrawalItems::StockLotId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WithdrawalItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WithdrawalItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Withdrawals {
        Table,
        Id,
        UserId,
        UbsId,
        PharmacistId,
        CreatedAt,
    }

    #[derive(Iden)]
    enum WithdrawalItems {
        Table,
        Id,
        WithdrawalId,
        MedicationId,
        StockLotId,
        Quantity,
    }
}

mod m20240101_000006_create_log_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_log_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditLog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditLog::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditLog::ActorId).big_integer().null())
                        .col(ColumnDef::new(AuditLog::Action).string().not_null())
                        .col(ColumnDef::new(AuditLog::Entity).string().not_null())
                        .col(ColumnDef::new(AuditLog::RecordId).big_integer().not_null())
                        .col(ColumnDef::new(AuditLog::Details).json().null())
                        .col(
                            ColumnDef::new(AuditLog::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SearchLog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SearchLog::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SearchLog::Term).string().not_null())
                        .col(ColumnDef::new(SearchLog::HadResults).boolean().not_null())
                        .col(ColumnDef::new(SearchLog::UserId).big_integer().null())
                        .col(
                            ColumnDef::new(SearchLog::FirstMedicationId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SearchLog::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SearchLog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AuditLog::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum AuditLog {
        Table,
        Id,
        ActorId,
        Action,
        Entity,
        RecordId,
        Details,
        CreatedAt,
    }

    #[derive(Iden)]
    enum SearchLog {
        Table,
        Id,
        Term,
        HadResults,
        UserId,
        FirstMedicationId,
        CreatedAt,
    }
}
