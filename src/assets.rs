use std::path::PathBuf;

pub const SOURCE_EXT: &str = "kbs";
pub const EXPECTED_EXT: &str = "expected";
pub const HTML_EXT: &str = "html";

pub fn default_suite_dir() -> PathBuf {
    ["asm"].iter().collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn suites_live_directly_under_the_default_root() {
        let suite = default_suite_dir().join("test");
        assert_eq!(suite, PathBuf::from("asm/test"));
        assert!(suite.is_dir());
    }
}
