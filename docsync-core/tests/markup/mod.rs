mod compatibility;
mod conversion;
