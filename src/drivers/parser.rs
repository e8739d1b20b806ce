use crate::types::Sample;
/// Field separator of the wire format: `<ms>,<mag_g>,<rms_g>`.
pub const DELIMITER: char = ',';
/// Decode one wire record. Anything that is not exactly three numeric fields
/// (with a non-negative integer timestamp) is rejected with `None`.
pub fn parse_record(line: &str) -> Option<Sample> {
    let mut fields = line.trim().split(DELIMITER);
    let (Some(ms), Some(mag), Some(rms), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return None;
    };
    Some(Sample {
        timestamp_ms: parse_timestamp(ms.trim())?,
        magnitude: mag.trim().parse().ok()?,
        rms: rms.trim().parse().ok()?,
    })
}
/// Non-negative integer milliseconds. A negative zero (`-0`, `-000`) is still zero.
fn parse_timestamp(field: &str) -> Option<u64> {
    match field.strip_prefix('-') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b == b'0') => Some(0),
        Some(_) => None,
        None => field.parse().ok(),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    #[test]
    fn accepts_well_formed_record() {
        let sample = parse_record("1234,0.0456,0.0238\r\n").unwrap();
        assert_eq!(sample.timestamp_ms, 1234);
        assert_eq!(sample.magnitude, 0.0456);
        assert_eq!(sample.rms, 0.0238);
    }
    #[test]
    fn tolerates_whitespace_around_fields() {
        let sample = parse_record("  10 , -1.5 ,2e-3 ").unwrap();
        assert_eq!(sample.timestamp_ms, 10);
        assert_eq!(sample.magnitude, -1.5);
        assert_eq!(sample.rms, 0.002);
    }
    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_record("").is_none());
        assert!(parse_record("bad,line").is_none());
        assert!(parse_record("1,2").is_none());
        assert!(parse_record("1,2,3,4").is_none());
        assert!(parse_record("1,2,3,").is_none());
    }
    #[test]
    fn rejects_non_numeric_fields() {
        assert!(parse_record("abc,0.1,0.2").is_none());
        assert!(parse_record("100,x,0.2").is_none());
        assert!(parse_record("100,0.1,").is_none());
        assert!(parse_record(",0.1,0.2").is_none());
        assert!(parse_record("1.5,0.1,0.2").is_none());
    }
    #[test]
    fn rejects_negative_and_overflowing_timestamps() {
        assert!(parse_record("-1,0.1,0.2").is_none());
        assert!(parse_record("99999999999999999999999,0.1,0.2").is_none());
    }
    #[test]
    fn negative_zero_timestamp_is_zero() {
        assert_eq!(parse_record("-0,0.1,0.2").unwrap().timestamp_ms, 0);
        assert_eq!(parse_record(" -000 ,0.1,0.2").unwrap().timestamp_ms, 0);
        assert!(parse_record("-,0.1,0.2").is_none());
        assert!(parse_record("-01,0.1,0.2").is_none());
        assert!(parse_record("--0,0.1,0.2").is_none());
    }
    #[test]
    fn decodes_random_valid_records_exactly() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let ms: u64 = rng.gen_range(0..u32::MAX as u64);
            let mag: f64 = rng.gen_range(-16.0..16.0);
            let rms: f64 = rng.gen_range(0.0..16.0);
            let line = format!("{ms},{mag},{rms}\n");
            let sample = parse_record(&line).unwrap();
            assert_eq!(
                sample,
                Sample {
                    timestamp_ms: ms,
                    magnitude: mag,
                    rms,
                }
            );
        }
    }
    #[test]
    fn rejects_random_garbage_without_panicking() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let len = rng.gen_range(0..24);
            let line: String = (0..len)
                .map(|_| rng.gen_range(b'!'..=b'~') as char)
                .filter(|c| !c.is_ascii_digit() && *c != ',')
                .collect();
            assert!(parse_record(&line).is_none());
        }
    }
}
