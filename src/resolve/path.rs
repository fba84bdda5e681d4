//! Specifier and module path helpers. Paths always use `/`.

const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".jsx", ".ts", ".mts", ".cts", ".tsx"];

/// A specifier that is not relative (`.`) or absolute (`/`), e.g. `lit`.
pub fn is_bare_module_specifier(specifier: &str) -> bool {
    !specifier.starts_with('.') && !specifier.starts_with('/')
}

/// Whether a path ends in a JavaScript or TypeScript extension.
pub fn has_script_extension(path: &str) -> bool {
    SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Directory part of a module path (`""` for top-level files).
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}

/// Collapse `.`, `..` and repeated separators.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Resolve `relative` against the directory `base`.
pub fn join(base: &str, relative: &str) -> String {
    if relative.starts_with('/') || base.is_empty() {
        normalize(relative)
    } else {
        normalize(&format!("{base}/{relative}"))
    }
}

/// Candidate files for an extension-less or mismatched-extension import.
pub fn candidates(path: &str) -> Vec<String> {
    let mut out = vec![path.to_string()];
    for ext in [".js", ".ts", ".mjs", ".jsx", ".tsx"] {
        out.push(format!("{path}{ext}"));
    }
    if let Some(stem) = path.strip_suffix(".js") {
        out.push(format!("{stem}.ts"));
        out.push(format!("{stem}.tsx"));
    }
    for index in ["index.js", "index.ts", "index.mjs"] {
        out.push(format!("{path}/{index}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_specifiers() {
        assert!(is_bare_module_specifier("lit"));
        assert!(is_bare_module_specifier("@scope/pkg/x.js"));
        assert!(!is_bare_module_specifier("./x.js"));
        assert!(!is_bare_module_specifier("../x.js"));
        assert!(!is_bare_module_specifier("/abs/x.js"));
    }

    #[test]
    fn test_normalize_and_join() {
        assert_eq!(normalize("src/./a/../b.js"), "src/b.js");
        assert_eq!(normalize("../x.js"), "../x.js");
        assert_eq!(normalize("/p//src/../a.js"), "/p/a.js");
        assert_eq!(join("src/components", "../utils.js"), "src/utils.js");
        assert_eq!(join("", "./a.js"), "a.js");
        assert_eq!(join("/project/src", "./foo.js"), "/project/src/foo.js");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("src/a.js"), "src");
        assert_eq!(dirname("a.js"), "");
        assert_eq!(dirname("/a.js"), "/");
    }

    #[test]
    fn test_candidates_swap_js_for_ts() {
        let c = candidates("src/a.js");
        assert!(c.contains(&"src/a.ts".to_string()));
        assert!(c.contains(&"src/a.js/index.js".to_string()));
        assert!(candidates("src/a").contains(&"src/a.ts".to_string()));
    }
}
