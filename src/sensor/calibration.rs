//! Dial angle to fill level mapping for the float gauge.
//!
//! The gauge needle's magnet is read as an angle in degrees. The table below
//! was measured against the printed dial. Angles decrease as the level rises,
//! except for the wrap-around segment between 300° and 235°.

/// `(angle in degrees, level in percent)`, ordered by descending angle.
pub const DIAL_TABLE: [(f64, f64); 19] = [
    (360.0, 86.0),
    (300.0, 95.0),
    (235.0, 0.0),
    (201.0, 10.0),
    (177.0, 15.0),
    (160.0, 20.0),
    (146.0, 25.0),
    (131.0, 30.0),
    (122.0, 35.0),
    (110.0, 40.0),
    (100.0, 45.0),
    (91.0, 50.0),
    (79.0, 55.0),
    (69.0, 60.0),
    (57.0, 65.0),
    (45.0, 70.0),
    (31.0, 75.0),
    (16.0, 80.0),
    (0.0, 85.0),
];

/// Interpolates `table` linearly and truncates to a whole percent.
///
/// Angles beyond either end of the table map to that end's level.
pub fn angle_to_level(angle: f64, table: &[(f64, f64)]) -> f64 {
    let (Some(&(first_angle, first_level)), Some(&(last_angle, last_level))) =
        (table.first(), table.last())
    else {
        return 0.0;
    };

    if angle >= first_angle {
        return first_level;
    }
    if angle <= last_angle {
        return last_level;
    }

    table
        .windows(2)
        .find(|w| w[0].0 >= angle && angle >= w[1].0)
        .map(|w| {
            let ((x1, y1), (x2, y2)) = (w[0], w[1]);
            (y1 + (y2 - y1) * (angle - x1) / (x2 - x1)).trunc()
        })
        .unwrap_or(last_level)
}
