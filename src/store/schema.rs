pub const SCHEMA: &str = r#"
-- Naming hierarchy: each level is unique within its parent
CREATE TABLE IF NOT EXISTS buildings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS floors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    building_id INTEGER NOT NULL REFERENCES buildings(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE(building_id, name)
);

CREATE TABLE IF NOT EXISTS areas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    floor_id INTEGER NOT NULL REFERENCES floors(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE(floor_id, name)
);

CREATE TABLE IF NOT EXISTS rooms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    area_id INTEGER NOT NULL REFERENCES areas(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE(area_id, name)
);

-- Addressable unit devices attach to (area + optional room + optional details)
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    area_id INTEGER NOT NULL REFERENCES areas(id) ON DELETE RESTRICT,
    room_id INTEGER REFERENCES rooms(id) ON DELETE RESTRICT,
    details TEXT
);

-- Lookup tables
CREATE TABLE IF NOT EXISTS device_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS brands (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS models (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    brand_id INTEGER NOT NULL REFERENCES brands(id) ON DELETE RESTRICT,
    value TEXT NOT NULL,
    UNIQUE(brand_id, value)
);

CREATE TABLE IF NOT EXISTS operating_systems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS ram_sizes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS storage_sizes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS processors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

-- Devices
CREATE TABLE IF NOT EXISTS devices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT UNIQUE,
    device_type_id INTEGER NOT NULL REFERENCES device_types(id) ON DELETE RESTRICT,
    location_id INTEGER NOT NULL REFERENCES locations(id) ON DELETE RESTRICT,
    brand_id INTEGER REFERENCES brands(id) ON DELETE RESTRICT,
    model_id INTEGER REFERENCES models(id) ON DELETE RESTRICT,
    os_id INTEGER REFERENCES operating_systems(id) ON DELETE RESTRICT,
    ram_id INTEGER REFERENCES ram_sizes(id) ON DELETE RESTRICT,
    storage_id INTEGER REFERENCES storage_sizes(id) ON DELETE RESTRICT,
    processor_id INTEGER REFERENCES processors(id) ON DELETE RESTRICT,
    architecture TEXT,
    serial TEXT,
    details TEXT
);

-- Workshop tickets
CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id INTEGER NOT NULL REFERENCES devices(id) ON DELETE RESTRICT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK(status IN ('pending', 'repaired', 'unrepaired')),
    date_in TEXT NOT NULL,
    date_out TEXT,
    details_in TEXT,
    details_out TEXT,
    CHECK(date_out IS NULL OR date_out >= date_in)
);

-- Academic periods (I-YYYY, II-YYYY)
CREATE TABLE IF NOT EXISTS periods (
    code TEXT PRIMARY KEY,
    starts_on TEXT NOT NULL,
    ends_on TEXT NOT NULL
);

-- NULL-safe natural keys: SQLite treats NULLs as distinct in plain UNIQUE constraints
CREATE UNIQUE INDEX IF NOT EXISTS idx_locations_natural
    ON locations(area_id, IFNULL(room_id, 0), IFNULL(details, ''));
CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_natural
    ON tickets(device_id, status, date_in, IFNULL(details_in, ''));

CREATE INDEX IF NOT EXISTS idx_locations_room ON locations(room_id);
CREATE INDEX IF NOT EXISTS idx_devices_location ON devices(location_id);
CREATE INDEX IF NOT EXISTS idx_devices_brand ON devices(brand_id);
CREATE INDEX IF NOT EXISTS idx_devices_model ON devices(model_id);
CREATE INDEX IF NOT EXISTS idx_tickets_device ON tickets(device_id);
CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
"#;
