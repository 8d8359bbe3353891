use chartsync_core::timezone::{TimezoneError, convert, try_convert};

#[test]
fn hong_kong_to_new_york() {
    assert_eq!(
        convert("2024-01-01 09:00", "Asia/Hong_Kong", "America/New_York"),
        "2023-12-31 20:00"
    );
}

#[test]
fn t_separator_and_seconds_are_accepted() {
    assert_eq!(
        convert("2024-01-01T09:00:30", "Asia/Hong_Kong", "UTC"),
        "2024-01-01 01:00"
    );
}

#[test]
fn respects_daylight_saving_on_both_sides() {
    // London is on BST, New York on EDT.
    assert_eq!(
        convert("2024-07-01 15:00", "Europe/London", "America/New_York"),
        "2024-07-01 10:00"
    );
    // Between the US and EU switch dates the gap is four hours.
    assert_eq!(
        convert("2024-03-20 12:00", "America/New_York", "Europe/London"),
        "2024-03-20 16:00"
    );
}

#[test]
fn date_only_labels_pass_through() {
    assert_eq!(convert("2024-05-01", "Asia/Tokyo", "America/Los_Angeles"), "2024-05-01");
}

#[test]
fn midnight_artifact_is_normalized() {
    assert_eq!(convert("2024-01-02 24:00", "UTC", "Asia/Tokyo"), "2024-01-02 09:00");
}

#[test]
fn failures_return_input_but_try_surfaces_them() {
    assert_eq!(convert("2024-01-01 09:00", "Mars/Olympus", "UTC"), "2024-01-01 09:00");
    assert!(matches!(
        try_convert("2024-01-01 09:00", "Mars/Olympus", "UTC"),
        Err(TimezoneError::UnknownZone(z)) if z == "Mars/Olympus"
    ));
    assert!(matches!(
        try_convert("yesterday", "UTC", "Asia/Tokyo"),
        Err(TimezoneError::InvalidWallClock(_))
    ));
}
