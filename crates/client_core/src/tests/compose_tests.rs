use super::*;

#[test]
fn trims_and_accepts_names_up_to_the_limit() {
    assert_eq!(validate_name("  Alice \n").expect("valid"), "Alice");
    let longest = "a".repeat(MAX_NAME_CHARS);
    assert_eq!(validate_name(&longest).expect("valid"), longest);
}

#[test]
fn rejects_empty_and_over_long_names() {
    assert_eq!(validate_name("   "), Err(ComposeError::NameEmpty));
    assert_eq!(
        validate_name(&"b".repeat(33)),
        Err(ComposeError::NameTooLong { chars: 33 })
    );
}

#[test]
fn name_length_counts_characters_not_bytes() {
    let name = "é".repeat(MAX_NAME_CHARS);
    assert!(name.len() > MAX_NAME_CHARS);
    assert!(validate_name(&name).is_ok());
}

#[test]
fn only_over_long_names_are_signalled() {
    assert!(!ComposeError::NameEmpty.is_user_visible());
    assert!(!ComposeError::MessageEmpty.is_user_visible());
    assert!(ComposeError::NameTooLong { chars: 40 }.is_user_visible());
}

#[test]
fn messages_are_trimmed_and_must_not_be_empty() {
    assert_eq!(validate_message("  hi there ").expect("valid"), "hi there");
    assert_eq!(validate_message("\t \n"), Err(ComposeError::MessageEmpty));
}

#[test]
fn guard_refuses_inside_window_and_reopens_after() {
    let mut guard = SubmitGuard::new(Duration::from_millis(500));
    let start = Instant::now();

    assert!(!guard.is_busy(start));
    assert!(guard.try_acquire(start));
    assert!(guard.is_busy(start + Duration::from_millis(499)));
    assert!(!guard.try_acquire(start + Duration::from_millis(100)));
    assert!(guard.try_acquire(start + Duration::from_millis(500)));
}

#[test]
fn refused_attempts_do_not_extend_the_window() {
    let mut guard = SubmitGuard::new(Duration::from_millis(500));
    let start = Instant::now();
    assert!(guard.try_acquire(start));
    assert!(!guard.try_acquire(start + Duration::from_millis(400)));
    assert!(guard.try_acquire(start + Duration::from_millis(501)));
}
