const KILOBYTE: u64 = 1 << 10;
const MEGABYTE: u64 = 1 << 20;
const GIGABYTE: u64 = 1 << 30;
const TERABYTE: u64 = 1 << 40;
const PETABYTE: u64 = 1 << 50;
const EXABYTE: u64 = 1 << 60;

/// Formats a byte count with a binary unit suffix and at most one decimal,
/// e.g. `1.5G`, `512M`, `10K` or `100B`.
pub fn byte_size(bytes: u64) -> String {
    let (unit, divisor) = match bytes {
        0 => return "0B".to_owned(),
        b if b >= EXABYTE => ("E", EXABYTE),
        b if b >= PETABYTE => ("P", PETABYTE),
        b if b >= TERABYTE => ("T", TERABYTE),
        b if b >= GIGABYTE => ("G", GIGABYTE),
        b if b >= MEGABYTE => ("M", MEGABYTE),
        b if b >= KILOBYTE => ("K", KILOBYTE),
        _ => ("B", 1),
    };

    let value = format!("{:.1}", bytes as f64 / divisor as f64);
    let value = value.strip_suffix(".0").unwrap_or(&value);
    format!("{value}{unit}")
}
