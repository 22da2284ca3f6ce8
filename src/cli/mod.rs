pub mod actions;
pub mod commands;
pub mod dispatch;

mod start;

pub use self::start::start;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_exported() {
        // The binary entry point consumes this exact surface.
        let entry: fn() -> anyhow::Result<actions::Action> = start;
        let _ = entry;
    }
}
