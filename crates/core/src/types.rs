/// All entity primary keys are 64-bit (PostgreSQL BIGSERIAL).
pub type DbId = i64;
