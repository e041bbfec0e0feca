//! Function documentation pages
//!
//! Pages come in three historical shapes. The code block is located by
//! the first shape that matches and replaced in place; the rest of the
//! page is left untouched.

use crate::functions::title_case;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMPLEMENTATION_BASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(## Implementation\s*```bash\s*)(.*?)(```)").expect("implementation regex is valid")
});

static DETAILS_SHELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<details>\s*(?:<summary>.*?</summary>\s*)?```shell\s*)(.*?)(```\s*</details>)")
        .expect("details shell regex is valid")
});

static DETAILS_BASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<details>\s*(?:<summary>.*?</summary>\s*)?```bash\s*)(.*?)(```\s*</details>)")
        .expect("details bash regex is valid")
});

/// Outcome of updating one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocUpdate {
    /// New page content
    Updated(String),
    /// Code already current
    Unchanged,
    /// No recognised code block
    NoPattern,
}

/// Page for a function with no documentation yet
#[must_use]
pub fn render_new_doc(func: &str, code: &str) -> String {
    let heading = title_case(func.strip_prefix("core_").unwrap_or(func));
    format!(
        "# {heading}

## Purpose

{func} function implementation from base.sh.

## Implementation

<details>
<summary>Function Code</summary>

```bash
{code}
```

</details>

## Usage

Document usage examples and parameters here.

## Notes

Add any implementation notes or considerations.
"
    )
}

/// Replace the function code inside an existing page
#[must_use]
pub fn update_doc(content: &str, func: &str, code: &str) -> DocUpdate {
    let (pattern, new_code) = if IMPLEMENTATION_BASH.is_match(content) {
        let new_code = if code.trim_start().starts_with("# Purpose:") {
            code.to_string()
        } else {
            format!("# Purpose: {func} function implementation\n{code}")
        };
        (&*IMPLEMENTATION_BASH, new_code)
    } else if DETAILS_SHELL.is_match(content) {
        (&*DETAILS_SHELL, code.to_string())
    } else if DETAILS_BASH.is_match(content) {
        (&*DETAILS_BASH, code.to_string())
    } else {
        return DocUpdate::NoPattern;
    };

    let updated = pattern.replace(content, |caps: &Captures<'_>| format!("{}{new_code}\n{}", &caps[1], &caps[3]));
    if updated == content {
        DocUpdate::Unchanged
    } else {
        DocUpdate::Updated(updated.into_owned())
    }
}
