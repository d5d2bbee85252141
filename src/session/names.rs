//! Display names for the simulator's integer codes

/// Returned for any code without a known name.
pub const UNKNOWN: &str = "desconocido";

/// Canonical session name for an `mSession` code.
///
/// Code 5 resolves to `Qual2` and code 6 has no name.
pub fn session_name(code: i32) -> &'static str {
    match code {
        0 => "TestDay",
        1 => "Practice1",
        2 => "Practice2",
        3 => "Practice3",
        4 => "Practice4",
        5 => "Qual2",
        7 => "Qual3",
        8 => "Qual4",
        9 => "WarmUp",
        10 => "Race1",
        11 => "Race2",
        12 => "Race3",
        13 => "Race4",
        _ => UNKNOWN,
    }
}

/// Display name for an `mFinishStatus` code. Still racing is the empty string.
pub fn finish_status_name(code: i32) -> &'static str {
    match code {
        0 => "",
        1 => "Finished",
        2 => "DNF",
        3 => "Disqualified",
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_names() {
        assert_eq!(session_name(0), "TestDay");
        assert_eq!(session_name(4), "Practice4");
        assert_eq!(session_name(5), "Qual2");
        assert_eq!(session_name(6), UNKNOWN);
        assert_eq!(session_name(9), "WarmUp");
        assert_eq!(session_name(11), "Race2");
        assert_eq!(session_name(99), UNKNOWN);
        assert_eq!(session_name(-1), UNKNOWN);
    }

    #[test]
    fn finish_status_names() {
        assert_eq!(finish_status_name(0), "");
        assert_eq!(finish_status_name(1), "Finished");
        assert_eq!(finish_status_name(2), "DNF");
        assert_eq!(finish_status_name(3), "Disqualified");
        assert_eq!(finish_status_name(4), UNKNOWN);
    }
}
