/// Render whole seconds as `M:SS`.
///
/// ```
/// use chartsync::format_mm_ss;
///
/// assert_eq!(format_mm_ss(0), "0:00");
/// assert_eq!(format_mm_ss(61), "1:01");
/// assert_eq!(format_mm_ss(180), "3:00");
/// ```
#[must_use]
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
