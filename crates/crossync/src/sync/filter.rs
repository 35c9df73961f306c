//! Compiles folder/extension allow and deny lists into rsync filter rules.
//!
//! rsync evaluates `--include`/`--exclude` rules first-match-wins, so the
//! order is part of the meaning:
//!
//! 1. `--include */` so every directory is traversed
//! 2. allowed folders, then allowed extensions
//! 3. denied folders, then denied extensions
//! 4. `--exclude *` when any allow-list was given
//!
//! [`FilterRulesBuilder`] encodes that order in its type: each stage can only
//! be reached from the previous one, and the trailing catch-all is decided
//! by `finish` from what was actually added.

use crate::error::{CrossyncError, Result};
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub folder_allow: Vec<String>,
    #[serde(default)]
    pub folder_deny: Vec<String>,
    #[serde(default)]
    pub ext_allow: Vec<String>,
    #[serde(default)]
    pub ext_deny: Vec<String>,
}

impl FilterSpec {
    pub fn has_allow_list(&self) -> bool {
        !self.folder_allow.is_empty() || !self.ext_allow.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.folder_allow.is_empty()
            && self.folder_deny.is_empty()
            && self.ext_allow.is_empty()
            && self.ext_deny.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for folder in &self.folder_allow {
            validate_folder("folder_white_list", folder)?;
        }
        for folder in &self.folder_deny {
            validate_folder("folder_black_list", folder)?;
        }
        for ext in &self.ext_allow {
            validate_extension("extension_white_list", ext)?;
        }
        for ext in &self.ext_deny {
            validate_extension("extension_black_list", ext)?;
        }
        Ok(())
    }
}

fn invalid(list: &'static str, value: &str, reason: &str) -> CrossyncError {
    CrossyncError::InvalidFilterSpec {
        list,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_folder(list: &'static str, folder: &str) -> Result<()> {
    let name = normalize_folder(folder);
    if name.trim().is_empty() {
        return Err(invalid(list, folder, "is empty"));
    }
    if name.starts_with('/') {
        return Err(invalid(list, folder, "must be relative to the source"));
    }
    if name.split('/').any(|component| component == "..") {
        return Err(invalid(list, folder, "must not contain '..'"));
    }
    check_glob(list, folder, &format!("{}/**", name))
}

fn validate_extension(list: &'static str, ext: &str) -> Result<()> {
    if ext.trim().is_empty() {
        return Err(invalid(list, ext, "is empty"));
    }
    if ext.contains('.') {
        return Err(invalid(list, ext, "must be a bare extension without '.'"));
    }
    if ext.contains('/') || ext.contains('\\') {
        return Err(invalid(list, ext, "must not contain a path separator"));
    }
    check_glob(list, ext, &format!("*.{}", ext))
}

fn check_glob(list: &'static str, value: &str, pattern: &str) -> Result<()> {
    Glob::new(pattern)
        .map(|_| ())
        .map_err(|e| invalid(list, value, &format!("is not a valid pattern ({})", e)))
}

fn normalize_folder(folder: &str) -> &str {
    let trimmed = folder.trim_end_matches('/');
    if trimmed.is_empty() {
        folder
    } else {
        trimmed
    }
}

/// The upper-case form of `ext`, if it differs from `ext` itself.
fn distinct_upper(ext: &str) -> Option<String> {
    let upper = ext.to_uppercase();
    (upper != ext).then_some(upper)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterVerb {
    Include,
    Exclude,
}

impl FilterVerb {
    pub fn as_flag(&self) -> &'static str {
        match self {
            FilterVerb::Include => "--include",
            FilterVerb::Exclude => "--exclude",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRule {
    pub verb: FilterVerb,
    pub pattern: String,
}

impl FilterRule {
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            verb: FilterVerb::Include,
            pattern: pattern.into(),
        }
    }

    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            verb: FilterVerb::Exclude,
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb.as_flag(), self.pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledFilterRules {
    rules: Vec<FilterRule>,
}

impl CompiledFilterRules {
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_catch_all(&self) -> bool {
        self.rules.last() == Some(&FilterRule::exclude("*"))
    }

    /// Flag/pattern pairs in rule order, as passed to rsync.
    pub fn to_args(&self) -> Vec<String> {
        self.rules
            .iter()
            .flat_map(|rule| [rule.verb.as_flag().to_string(), rule.pattern.clone()])
            .collect()
    }
}

impl<'a> IntoIterator for &'a CompiledFilterRules {
    type Item = &'a FilterRule;
    type IntoIter = std::slice::Iter<'a, FilterRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

pub struct FolderAllow;
pub struct ExtAllow;
pub struct FolderDeny;
pub struct ExtDeny;
pub struct Done;

/// Ordered builder for [`CompiledFilterRules`].
pub struct FilterRulesBuilder<Stage> {
    rules: Vec<FilterRule>,
    allow_list_used: bool,
    _stage: PhantomData<Stage>,
}

impl<Stage> FilterRulesBuilder<Stage> {
    fn advance<Next>(self) -> FilterRulesBuilder<Next> {
        FilterRulesBuilder {
            rules: self.rules,
            allow_list_used: self.allow_list_used,
            _stage: PhantomData,
        }
    }

    fn push_extension(&mut self, verb: FilterVerb, ext: &str) {
        self.rules.push(FilterRule {
            verb,
            pattern: format!("*.{}", ext),
        });
        if let Some(upper) = distinct_upper(ext) {
            self.rules.push(FilterRule {
                verb,
                pattern: format!("*.{}", upper),
            });
        }
    }
}

impl FilterRulesBuilder<FolderAllow> {
    pub fn new() -> Self {
        Self {
            rules: vec![FilterRule::include("*/")],
            allow_list_used: false,
            _stage: PhantomData,
        }
    }

    pub fn allow_folders<I, S>(mut self, folders: I) -> FilterRulesBuilder<ExtAllow>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for folder in folders {
            let name = normalize_folder(folder.as_ref());
            self.rules.push(FilterRule::include(format!("{}/", name)));
            self.rules.push(FilterRule::include(format!("{}/**", name)));
            self.allow_list_used = true;
        }
        self.advance()
    }
}

impl Default for FilterRulesBuilder<FolderAllow> {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRulesBuilder<ExtAllow> {
    pub fn allow_extensions<I, S>(mut self, extensions: I) -> FilterRulesBuilder<FolderDeny>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            self.push_extension(FilterVerb::Include, ext.as_ref());
            self.allow_list_used = true;
        }
        self.advance()
    }
}

impl FilterRulesBuilder<FolderDeny> {
    pub fn deny_folders<I, S>(mut self, folders: I) -> FilterRulesBuilder<ExtDeny>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for folder in folders {
            let name = normalize_folder(folder.as_ref());
            self.rules.push(FilterRule::exclude(format!("{}/", name)));
        }
        self.advance()
    }
}

impl FilterRulesBuilder<ExtDeny> {
    pub fn deny_extensions<I, S>(mut self, extensions: I) -> FilterRulesBuilder<Done>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            self.push_extension(FilterVerb::Exclude, ext.as_ref());
        }
        self.advance()
    }
}

impl FilterRulesBuilder<Done> {
    pub fn finish(mut self) -> CompiledFilterRules {
        if self.allow_list_used {
            self.rules.push(FilterRule::exclude("*"));
        }
        CompiledFilterRules { rules: self.rules }
    }
}

/// Validates `spec` and compiles it into ordered rsync filter rules.
pub fn compile_filters(spec: &FilterSpec) -> Result<CompiledFilterRules> {
    spec.validate()?;

    let rules = FilterRulesBuilder::new()
        .allow_folders(&spec.folder_allow)
        .allow_extensions(&spec.ext_allow)
        .deny_folders(&spec.folder_deny)
        .deny_extensions(&spec.ext_deny)
        .finish();

    log::debug!("Compiled {} filter rules", rules.len());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_spec_only_traverses_directories() {
        let rules = compile_filters(&FilterSpec::default()).unwrap();
        assert_eq!(rules.rules(), &[FilterRule::include("*/")]);
        assert!(!rules.has_catch_all());
    }

    #[test]
    fn test_extension_allow_list() {
        let spec = FilterSpec {
            ext_allow: strings(&["jpg"]),
            ..Default::default()
        };
        let rules = compile_filters(&spec).unwrap();
        assert_eq!(
            rules.rules(),
            &[
                FilterRule::include("*/"),
                FilterRule::include("*.jpg"),
                FilterRule::include("*.JPG"),
                FilterRule::exclude("*"),
            ]
        );
    }

    #[test]
    fn test_full_ordering() {
        let spec = FilterSpec {
            folder_allow: strings(&["Photos", "Docs/"]),
            folder_deny: strings(&["Photos/tmp"]),
            ext_allow: strings(&["png"]),
            ext_deny: strings(&["tmp"]),
        };
        let rules = compile_filters(&spec).unwrap();
        let rendered: Vec<String> = rules.rules().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "--include */",
                "--include Photos/",
                "--include Photos/**",
                "--include Docs/",
                "--include Docs/**",
                "--include *.png",
                "--include *.PNG",
                "--exclude Photos/tmp/",
                "--exclude *.tmp",
                "--exclude *.TMP",
                "--exclude *",
            ]
        );
    }

    #[test]
    fn test_deny_lists_alone_have_no_catch_all() {
        let spec = FilterSpec {
            folder_deny: strings(&["node_modules"]),
            ext_deny: strings(&["log"]),
            ..Default::default()
        };
        let rules = compile_filters(&spec).unwrap();
        assert!(!rules.has_catch_all());
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_extension_case_duplication_follows_uppercase_comparison() {
        let spec = FilterSpec {
            ext_allow: strings(&["mp4", "7z", "123"]),
            ext_deny: strings(&["JPG"]),
            ..Default::default()
        };
        let rules = compile_filters(&spec).unwrap();
        let patterns: Vec<&str> = rules.rules().iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec!["*/", "*.mp4", "*.MP4", "*.7z", "*.7Z", "*.123", "*.JPG", "*"]
        );
    }

    #[test]
    fn test_to_args_pairs_flags_with_patterns() {
        let spec = FilterSpec {
            ext_deny: strings(&["iso"]),
            ..Default::default()
        };
        let rules = compile_filters(&spec).unwrap();
        assert_eq!(
            rules.to_args(),
            strings(&["--include", "*/", "--exclude", "*.iso", "--exclude", "*.ISO"])
        );
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let cases = [
            FilterSpec { ext_allow: strings(&[".jpg"]), ..Default::default() },
            FilterSpec { ext_deny: strings(&[""]), ..Default::default() },
            FilterSpec { ext_deny: strings(&["a/b"]), ..Default::default() },
            FilterSpec { folder_allow: strings(&["/abs"]), ..Default::default() },
            FilterSpec { folder_deny: strings(&["../up"]), ..Default::default() },
            FilterSpec { folder_deny: strings(&["   "]), ..Default::default() },
            FilterSpec { folder_allow: strings(&["bad[class"]), ..Default::default() },
        ];

        for spec in cases {
            let err = compile_filters(&spec).unwrap_err();
            assert!(
                matches!(err, CrossyncError::InvalidFilterSpec { .. }),
                "unexpected error for {:?}: {}",
                spec,
                err
            );
        }
    }

    #[test]
    fn test_invalid_entry_names_its_list() {
        let spec = FilterSpec {
            ext_deny: strings(&["tar.gz"]),
            ..Default::default()
        };
        match compile_filters(&spec) {
            Err(CrossyncError::InvalidFilterSpec { list, value, .. }) => {
                assert_eq!(list, "extension_black_list");
                assert_eq!(value, "tar.gz");
            }
            other => panic!("expected InvalidFilterSpec, got {:?}", other),
        }
    }

    fn name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,6}"
    }

    fn spec() -> impl Strategy<Value = FilterSpec> {
        (
            prop::collection::vec(name(), 0..3),
            prop::collection::vec(name(), 0..3),
            prop::collection::vec(name(), 0..3),
            prop::collection::vec(name(), 0..3),
        )
            .prop_map(|(folder_allow, folder_deny, ext_allow, ext_deny)| FilterSpec {
                folder_allow,
                folder_deny,
                ext_allow,
                ext_deny,
            })
    }

    proptest! {
        #[test]
        fn prop_compile_is_deterministic(spec in spec()) {
            prop_assert_eq!(compile_filters(&spec).unwrap(), compile_filters(&spec).unwrap());
        }

        #[test]
        fn prop_directory_rule_first_and_catch_all_iff_allow(spec in spec()) {
            let rules = compile_filters(&spec).unwrap();
            prop_assert_eq!(&rules.rules()[0], &FilterRule::include("*/"));
            prop_assert_eq!(rules.has_catch_all(), spec.has_allow_list());
        }
    }
}
