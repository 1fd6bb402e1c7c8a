use super::*;

#[test]
fn test_shallow_nesting() {
    fn depth(n: u32) -> u32 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    assert_eq!(depth(16), 16);
}

#[test]
fn test_deep_nesting() {
    // Mirrors a resume chain through 200k nested wrappers
    fn forward(n: u64, acc: &mut Vec<u8>) -> u64 {
        ensure_sufficient_stack(|| {
            if n == 0 {
                acc.len() as u64
            } else {
                forward(n - 1, acc) + 1
            }
        })
    }

    let mut acc = vec![0u8; 3];
    assert_eq!(forward(200_000, &mut acc), 200_003);
}

#[test]
fn test_returns_closure_result() {
    let result: Result<&str, String> = ensure_sufficient_stack(|| Ok("done"));
    assert_eq!(result, Ok("done"));
}

#[test]
fn test_remaining_stack_reported() {
    #[cfg(not(target_arch = "wasm32"))]
    assert!(remaining_stack().is_some_and(|bytes| bytes > 0));
}
