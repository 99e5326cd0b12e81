// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Minimal GLSL front end: preprocessing and uniform reflection.
//!
//! Enough of the preprocessor to honour `#define`, `#undef`, `#ifdef`,
//! `#ifndef`, `#if`/`#elif` over `defined(..)` and integer macros, `#else`,
//! `#endif` and `#error`. Uniforms are reported the way a linker reports
//! active uniforms: arrays of basic types as `name[0]` with their length,
//! struct members flattened as `name[i].field`.

use std::collections::HashMap;

use radiant_core::renderer::{UniformInfo, UniformKind};

#[derive(Debug, Clone, Copy)]
struct Branch {
    parent_active: bool,
    active: bool,
    taken: bool,
}

/// Runs the preprocessor over `source`, returning the surviving lines.
///
/// ## Errors
///
/// Returns the message of an active `#error`, or a description of an
/// unbalanced conditional.
pub fn preprocess(source: &str) -> Result<String, String> {
    let mut defines: HashMap<String, String> = HashMap::new();
    let mut stack: Vec<Branch> = Vec::new();
    let mut out = String::with_capacity(source.len());

    for (line_no, raw) in source.lines().enumerate() {
        let line = raw.trim();
        let active = stack.last().map_or(true, |b| b.active);

        let Some(directive) = line.strip_prefix('#') else {
            if active {
                out.push_str(raw);
                out.push('\n');
            }
            continue;
        };

        let directive = directive.trim_start();
        let (keyword, rest) = directive
            .split_once(char::is_whitespace)
            .map_or((directive, ""), |(k, r)| (k, r.trim()));

        match keyword {
            "ifdef" | "ifndef" | "if" => {
                let cond = match keyword {
                    "ifdef" => defines.contains_key(rest),
                    "ifndef" => !defines.contains_key(rest),
                    _ => eval_condition(rest, &defines),
                };
                let taken = active && cond;
                stack.push(Branch {
                    parent_active: active,
                    active: taken,
                    taken,
                });
            }
            "elif" => {
                let b = stack
                    .last_mut()
                    .ok_or_else(|| format!("line {}: #elif without #if", line_no + 1))?;
                let cond = b.parent_active && !b.taken && eval_condition(rest, &defines);
                b.active = cond;
                b.taken |= cond;
            }
            "else" => {
                let b = stack
                    .last_mut()
                    .ok_or_else(|| format!("line {}: #else without #if", line_no + 1))?;
                b.active = b.parent_active && !b.taken;
                b.taken = true;
            }
            "endif" => {
                stack
                    .pop()
                    .ok_or_else(|| format!("line {}: #endif without #if", line_no + 1))?;
            }
            "define" if active => {
                let (name, value) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(n, v)| (n, v.trim()));
                defines.insert(name.to_string(), value.to_string());
            }
            "undef" if active => {
                defines.remove(rest);
            }
            "error" if active => {
                return Err(format!("line {}: #error {}", line_no + 1, rest));
            }
            _ => {
                // #version, #extension and inactive directives pass through untouched.
                if active && (keyword == "version" || keyword == "extension") {
                    out.push_str(raw);
                    out.push('\n');
                }
            }
        }

        // Keep object-like macros available to array sizes after preprocessing.
        if keyword == "define" && active {
            out.push_str(raw);
            out.push('\n');
        }
    }

    if !stack.is_empty() {
        return Err("unterminated #if block".to_string());
    }
    Ok(out)
}

fn eval_condition(expr: &str, defines: &HashMap<String, String>) -> bool {
    expr.split("||").any(|alt| {
        alt.split("&&").all(|term| {
            let term = term.trim();
            let (negate, term) = match term.strip_prefix('!') {
                Some(t) => (true, t.trim()),
                None => (false, term),
            };
            let value = if let Some(inner) = term.strip_prefix("defined") {
                let name = inner.trim().trim_start_matches('(').trim_end_matches(')').trim();
                defines.contains_key(name)
            } else {
                resolve_int(term, defines).is_some_and(|v| v != 0)
            };
            value != negate
        })
    })
}

fn resolve_int(token: &str, defines: &HashMap<String, String>) -> Option<i64> {
    let mut current = token.trim();
    // Bounded to break macro loops.
    for _ in 0..16 {
        if let Ok(v) = current.parse::<i64>() {
            return Some(v);
        }
        current = defines.get(current)?.trim();
    }
    None
}

#[derive(Debug, Clone)]
struct Field {
    ty: String,
    name: String,
    len: Option<i32>,
}

fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for n in chars.by_ref() {
                        if n == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for n in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

fn tokenize(src: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in src.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

const QUALIFIERS: &[&str] = &["lowp", "mediump", "highp", "flat", "smooth"];

/// Parses `type name[len], name2;` declarations until the terminating `;`.
fn parse_declarators(
    tokens: &[String],
    mut i: usize,
    defines: &HashMap<String, String>,
) -> (Vec<Field>, usize) {
    while i < tokens.len() && QUALIFIERS.contains(&tokens[i].as_str()) {
        i += 1;
    }
    let Some(ty) = tokens.get(i).cloned() else {
        return (Vec::new(), i);
    };
    i += 1;

    let mut fields = Vec::new();
    while i < tokens.len() && tokens[i] != ";" {
        let name = tokens[i].clone();
        i += 1;
        let mut len = None;
        if tokens.get(i).map(String::as_str) == Some("[") {
            let size = tokens
                .get(i + 1)
                .and_then(|t| resolve_int(t, defines))
                .unwrap_or(1);
            len = Some(size as i32);
            while i < tokens.len() && tokens[i] != "]" {
                i += 1;
            }
            i += 1;
        }
        // Skip initializers up to the next declarator.
        while i < tokens.len() && tokens[i] != "," && tokens[i] != ";" {
            i += 1;
        }
        fields.push(Field {
            ty: ty.clone(),
            name,
            len,
        });
        if tokens.get(i).map(String::as_str) == Some(",") {
            i += 1;
        }
    }
    (fields, i + 1)
}

fn collect_defines(src: &str) -> HashMap<String, String> {
    src.lines()
        .filter_map(|l| l.trim().strip_prefix('#'))
        .filter_map(|d| d.trim_start().strip_prefix("define"))
        .filter_map(|d| {
            let d = d.trim();
            let (n, v) = d.split_once(char::is_whitespace).unwrap_or((d, ""));
            (!n.is_empty()).then(|| (n.to_string(), v.trim().to_string()))
        })
        .collect()
}

fn expand(
    prefix: &str,
    field: &Field,
    structs: &HashMap<String, Vec<Field>>,
    out: &mut Vec<UniformInfo>,
) {
    let base = format!("{}{}", prefix, field.name);
    match structs.get(&field.ty) {
        Some(members) => {
            let count = field.len.unwrap_or(1);
            for e in 0..count {
                let elem = match field.len {
                    Some(_) => format!("{}[{}].", base, e),
                    None => format!("{}.", base),
                };
                for m in members {
                    expand(&elem, m, structs, out);
                }
            }
        }
        None => out.push(UniformInfo {
            name: match field.len {
                Some(_) => format!("{}[0]", base),
                None => base,
            },
            kind: UniformKind::from_glsl(&field.ty),
            size: field.len.unwrap_or(1),
        }),
    }
}

/// Lists the uniforms declared by an already preprocessed source.
pub fn reflect_uniforms(preprocessed: &str) -> Vec<UniformInfo> {
    let defines = collect_defines(preprocessed);
    let code: String = preprocessed
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let tokens = tokenize(&strip_comments(&code));

    let mut structs: HashMap<String, Vec<Field>> = HashMap::new();
    let mut uniforms = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].as_str() {
            "struct" => {
                let name = tokens.get(i + 1).cloned().unwrap_or_default();
                i += 3; // struct Name {
                let mut members = Vec::new();
                while i < tokens.len() && tokens[i] != "}" {
                    let (fields, next) = parse_declarators(&tokens, i, &defines);
                    members.extend(fields);
                    i = next;
                }
                structs.insert(name, members);
                i += 1;
            }
            "uniform" => {
                if tokens.get(i + 2).map(String::as_str) == Some("{") {
                    // Uniform blocks are not reported as plain uniforms.
                    while i < tokens.len() && tokens[i] != "}" {
                        i += 1;
                    }
                    i += 1;
                    continue;
                }
                let (fields, next) = parse_declarators(&tokens, i + 1, &defines);
                for f in &fields {
                    expand("", f, &structs, &mut uniforms);
                }
                i = next;
            }
            _ => i += 1,
        }
    }
    uniforms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditionals() {
        let src = "#version 330 core\n#define A\n#ifdef A\nuniform float uA;\n#else\nuniform float uNotA;\n#endif\n#ifndef B\nuniform int uNoB;\n#endif\n";
        let out = preprocess(src).unwrap();
        assert!(out.contains("uA"));
        assert!(!out.contains("uNotA"));
        assert!(out.contains("uNoB"));
    }

    #[test]
    fn test_nested_inactive_branch_stays_inactive() {
        let src = "#ifdef MISSING\n#ifdef ALSO\nx\n#else\ny\n#endif\n#else\nz\n#endif\n";
        let out = preprocess(src).unwrap();
        assert_eq!(out.trim(), "z");
    }

    #[test]
    fn test_if_defined_expressions() {
        let src = "#define X\n#define N 2\n#if defined(X) && !defined(Y)\na\n#endif\n#if N\nb\n#endif\n#if defined(Y) || N\nc\n#endif\n";
        let out = preprocess(src).unwrap();
        assert!(out.contains('a'));
        assert!(out.contains('b'));
        assert!(out.contains('c'));
    }

    #[test]
    fn test_error_and_unbalanced() {
        assert!(preprocess("#error nope\n").is_err());
        assert!(preprocess("#ifdef A\n").is_err());
        assert!(preprocess("#endif\n").is_err());
        assert!(preprocess("#ifdef A\n#error hidden\n#endif\n").is_ok());
    }

    #[test]
    fn test_reflect_structs_and_arrays() {
        let src = "#define NUM 2\nstruct L { vec3 color; float energy; };\nuniform L uLights[NUM];\nuniform mat4 uBones[4]; // bones\nuniform sampler2D uTex;\nuniform highp float uA, uB;\n";
        let u = reflect_uniforms(&preprocess(src).unwrap());
        let names: Vec<&str> = u.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "uLights[0].color",
                "uLights[0].energy",
                "uLights[1].color",
                "uLights[1].energy",
                "uBones[0]",
                "uTex",
                "uA",
                "uB",
            ]
        );
        assert_eq!(u[4].size, 4);
        assert_eq!(u[5].kind, UniformKind::Sampler2D);
    }
}
