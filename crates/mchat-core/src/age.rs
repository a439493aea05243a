use jiff::civil::Date;

/// Whole calendar months elapsed between `birth` and `observed`.
///
/// Counts the month difference, then borrows one month when the observation
/// day-of-month falls before the birth day-of-month. Never negative: a birth
/// date after the observation date yields 0.
pub fn age_in_months(birth: Date, observed: Date) -> u32 {
    let years = i32::from(observed.year()) - i32::from(birth.year());
    let mut months = years * 12 + i32::from(observed.month()) - i32::from(birth.month());
    if observed.day() < birth.day() {
        months -= 1;
    }
    months.max(0) as u32
}
