//! `snake_case` -> `camelCase` field/argument renaming (SPEC_FULL.md §3:
//! "fields and arguments are renamed to `camelCase` in the schema by
//! default, unless an explicit `name` is supplied").

/// Renames a Rust identifier into the `camelCase` convention GraphQL fields
/// and arguments use by default.
pub fn to_camel_case(s: &str) -> String {
    let mut dest = String::new();

    let s_iter = if let Some(s) = s.strip_prefix("__") {
        dest.push_str("__");
        s
    } else {
        s.strip_prefix('_').unwrap_or(s)
    }
    .split('_')
    .enumerate();

    for (i, part) in s_iter {
        if i > 0 && part.len() == 1 {
            dest.push_str(&part.to_uppercase());
        } else if i > 0 && part.len() > 1 {
            let first = part.chars().next().unwrap().to_uppercase().collect::<String>();
            dest.push_str(&first);
            dest.push_str(&part[1..]);
        } else if i == 0 {
            dest.push_str(part);
        }
    }

    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_correctly() {
        for (input, expected) in [
            ("test", "test"),
            ("_test", "test"),
            ("__test", "__test"),
            ("first_second", "firstSecond"),
            ("first_", "first"),
            ("a_b_c", "aBC"),
            ("add_user", "addUser"),
        ] {
            assert_eq!(to_camel_case(input), expected);
        }
    }
}
