//! Initial database migration.
//!
//! Creates the fleet and trip ledger tables, their enums, and the triggers
//! that freeze a trip once it is CLOSED.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: FLEET
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(TRUCKS_SQL).await?;

        // ============================================================
        // PART 3: TRIP LEDGER
        // ============================================================
        db.execute_unprepared(TRIPS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL DEFINITIONS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE trip_status AS ENUM ('PLANNED', 'ACTIVE', 'CLOSED');

CREATE TYPE expense_category AS ENUM (
    'FUEL', 'TOLL', 'POLICE', 'LOADING', 'UNLOADING', 'REPAIR', 'OTHER'
);

CREATE TYPE payment_type AS ENUM ('ADVANCE', 'SETTLEMENT');

CREATE TYPE payment_mode AS ENUM ('CASH', 'UPI', 'BANK');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL UNIQUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRUCKS_SQL: &str = r"
CREATE TABLE trucks (
    id                  UUID PRIMARY KEY,
    company_id          UUID NOT NULL REFERENCES companies(id) ON DELETE RESTRICT,
    number_plate        VARCHAR(32) NOT NULL UNIQUE,
    daily_fixed_cost    NUMERIC(14, 2),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_trucks_plate_normalized CHECK (
        number_plate = UPPER(BTRIM(number_plate)) AND number_plate <> ''
    ),
    CONSTRAINT chk_trucks_fixed_cost_positive CHECK (
        daily_fixed_cost IS NULL OR daily_fixed_cost > 0
    )
);

CREATE INDEX idx_trucks_company ON trucks(company_id);
";

const TRIPS_SQL: &str = r"
CREATE TABLE trips (
    id                  UUID PRIMARY KEY,
    truck_id            UUID NOT NULL REFERENCES trucks(id) ON DELETE RESTRICT,
    source              VARCHAR(255) NOT NULL,
    destination         VARCHAR(255) NOT NULL,
    status              trip_status NOT NULL DEFAULT 'PLANNED',
    estimated_qty       NUMERIC(14, 3),
    actual_qty          NUMERIC(14, 3),
    rate_per_unit       NUMERIC(14, 2),
    start_date          TIMESTAMPTZ,
    end_date            TIMESTAMPTZ,

    -- Closing snapshot, frozen at close
    final_revenue       NUMERIC(28, 2),
    final_expenses      NUMERIC(28, 2),
    final_balance       NUMERIC(28, 2),
    closed_at           TIMESTAMPTZ,
    closed_by           VARCHAR(255),

    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_trips_estimated_qty_positive CHECK (estimated_qty IS NULL OR estimated_qty > 0),
    CONSTRAINT chk_trips_actual_qty_positive CHECK (actual_qty IS NULL OR actual_qty > 0),
    CONSTRAINT chk_trips_rate_positive CHECK (rate_per_unit IS NULL OR rate_per_unit > 0),
    CONSTRAINT chk_trips_started CHECK (status = 'PLANNED' OR start_date IS NOT NULL),
    CONSTRAINT chk_trips_snapshot CHECK (
        (status = 'CLOSED') = (
            final_revenue IS NOT NULL
            AND final_expenses IS NOT NULL
            AND final_balance IS NOT NULL
            AND closed_at IS NOT NULL
            AND closed_by IS NOT NULL
        )
    )
);

CREATE INDEX idx_trips_truck ON trips(truck_id);
CREATE INDEX idx_trips_status ON trips(status);
CREATE INDEX idx_trips_created ON trips(created_at DESC);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id              UUID PRIMARY KEY,
    trip_id         UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    category        expense_category NOT NULL,
    amount          NUMERIC(14, 2) NOT NULL,
    expense_date    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    note            TEXT,
    bill_path       TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_expenses_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_expenses_trip ON expenses(trip_id, expense_date);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id              UUID PRIMARY KEY,
    trip_id         UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    amount          NUMERIC(14, 2) NOT NULL,
    payment_type    payment_type NOT NULL,
    mode            payment_mode NOT NULL,
    payment_date    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    note            TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_payments_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_trip ON payments(trip_id, payment_date);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_closed_trip_modification
-- A CLOSED trip row never changes again
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_closed_trip_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'CLOSED' THEN
        RAISE EXCEPTION 'Trip % is closed and cannot be modified', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_closed_trip_mod
BEFORE UPDATE ON trips
FOR EACH ROW
EXECUTE FUNCTION prevent_closed_trip_modification();

-- ============================================================
-- FUNCTION: prevent_closed_trip_children
-- Expenses and payments of a CLOSED trip are read-only.
-- A trip row that is already gone (cascade delete) does not block.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_closed_trip_children()
RETURNS TRIGGER AS $$
DECLARE
    parent_status trip_status;
BEGIN
    IF TG_OP IN ('UPDATE', 'DELETE') THEN
        SELECT status INTO parent_status FROM trips WHERE id = OLD.trip_id;
        IF parent_status = 'CLOSED' THEN
            RAISE EXCEPTION 'Trip % is closed and cannot be modified', OLD.trip_id;
        END IF;
    END IF;

    IF TG_OP IN ('INSERT', 'UPDATE') THEN
        SELECT status INTO parent_status FROM trips WHERE id = NEW.trip_id;
        IF parent_status = 'CLOSED' THEN
            RAISE EXCEPTION 'Trip % is closed and cannot be modified', NEW.trip_id;
        END IF;
        RETURN NEW;
    END IF;

    RETURN OLD;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_expenses_closed_trip
BEFORE INSERT OR UPDATE OR DELETE ON expenses
FOR EACH ROW
EXECUTE FUNCTION prevent_closed_trip_children();

CREATE TRIGGER trg_payments_closed_trip
BEFORE INSERT OR UPDATE OR DELETE ON payments
FOR EACH ROW
EXECUTE FUNCTION prevent_closed_trip_children();

-- ============================================================
-- FUNCTION: validate_trip_transition
-- PLANNED -> ACTIVE -> CLOSED, nothing else
-- ============================================================
CREATE OR REPLACE FUNCTION validate_trip_transition()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.status = OLD.status THEN
        RETURN NEW;
    END IF;

    IF NOT (
        (OLD.status = 'PLANNED' AND NEW.status = 'ACTIVE')
        OR (OLD.status = 'ACTIVE' AND NEW.status = 'CLOSED')
    ) THEN
        RAISE EXCEPTION 'Invalid trip transition: % -> %', OLD.status, NEW.status;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_validate_trip_transition
BEFORE UPDATE OF status ON trips
FOR EACH ROW
EXECUTE FUNCTION validate_trip_transition();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_validate_trip_transition ON trips;
DROP TRIGGER IF EXISTS trg_payments_closed_trip ON payments;
DROP TRIGGER IF EXISTS trg_expenses_closed_trip ON expenses;
DROP TRIGGER IF EXISTS trg_prevent_closed_trip_mod ON trips;

DROP FUNCTION IF EXISTS validate_trip_transition();
DROP FUNCTION IF EXISTS prevent_closed_trip_children();
DROP FUNCTION IF EXISTS prevent_closed_trip_modification();

DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS trips;
DROP TABLE IF EXISTS trucks;
DROP TABLE IF EXISTS companies;

DROP TYPE IF EXISTS payment_mode;
DROP TYPE IF EXISTS payment_type;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS trip_status;
";
