/// Human-readable rendering of a minute count ("1h 05m"). Minutes are
/// stored structured everywhere; this exists only for presentation.
pub fn format_minutes(total: i64) -> String {
    if total <= 0 {
        return "0m".to_string();
    }
    if total < 60 {
        return format!("{}m", total);
    }
    format!("{}h {:02}m", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::format_minutes;

    #[test]
    fn renders_minutes_and_hours() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(-3), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(65), "1h 05m");
        assert_eq!(format_minutes(120), "2h 00m");
    }
}
