//! Built-in implementations of the XPath 1.0 core function library.

use super::engine::{EvaluationContext, XPathValue, string_to_number};
use crate::datasource::DataSourceNode;
use crate::error::XPathError;

type FuncResult<N> = Result<XPathValue<N>, XPathError>;

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<'a, 'd, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> FuncResult<N> {
    match name {
        // Node-set
        "last" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_size as f64))
        }
        "position" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_position as f64))
        }
        "count" => func_count(name, args),
        "local-name" => func_name(name, args, e_ctx, true),
        "name" => func_name(name, args, e_ctx, false),
        "namespace-uri" => {
            arity(name, &args, 0, 1)?;
            let target = match args.into_iter().next() {
                Some(arg) => node_set_arg(name, arg)?.into_iter().next(),
                None => Some(e_ctx.context_node),
            };
            let uri = target.and_then(|node| node.namespace_uri()).unwrap_or("");
            Ok(XPathValue::String(uri.to_string()))
        }
        // No DTD is read, so no attribute is ever of type ID.
        "id" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::NodeSet(vec![]))
        }

        // String
        "string" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::String(string_arg_or_context(args, e_ctx)))
        }
        "concat" => func_concat(name, args),
        "starts-with" => {
            let (s, prefix) = two_strings(name, args)?;
            Ok(XPathValue::Boolean(s.starts_with(&prefix)))
        }
        "contains" => {
            let (s, needle) = two_strings(name, args)?;
            Ok(XPathValue::Boolean(s.contains(&needle)))
        }
        "substring-before" => {
            let (s, sep) = two_strings(name, args)?;
            let before = s.find(&sep).map(|i| &s[..i]).unwrap_or("");
            Ok(XPathValue::String(before.to_string()))
        }
        "substring-after" => {
            let (s, sep) = two_strings(name, args)?;
            let after = s.find(&sep).map(|i| &s[i + sep.len()..]).unwrap_or("");
            Ok(XPathValue::String(after.to_string()))
        }
        "substring" => func_substring(name, args),
        "string-length" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }
        "translate" => func_translate(name, args),

        // Boolean
        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(true))
        }
        "false" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(false))
        }
        "lang" => func_lang(name, args, e_ctx),

        // Number
        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.first() {
                Some(arg) => arg.to_number(),
                None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => func_sum(name, args),
        "floor" => unary_number(name, args, f64::floor),
        "ceiling" => unary_number(name, args, f64::ceil),
        "round" => unary_number(name, args, xpath_round),

        _ => Err(XPathError::function(name, "Unknown XPath function")),
    }
}

fn arity<N>(name: &str, args: &[XPathValue<N>], min: usize, max: usize) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(XPathError::function(
            name,
            format!("Expected {} argument(s), got {}", expected, args.len()),
        ));
    }
    Ok(())
}

fn string_arg_or_context<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> String {
    match args.into_iter().next() {
        Some(arg) => arg.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

fn two_strings<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
) -> Result<(String, String), XPathError> {
    arity(name, &args, 2, 2)?;
    Ok((args[0].to_string(), args[1].to_string()))
}

fn node_set_arg<N>(name: &str, arg: XPathValue<N>) -> Result<Vec<N>, XPathError> {
    match arg {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        _ => Err(XPathError::function(name, "Argument must be a node-set")),
    }
}

fn func_count<'a, N: DataSourceNode<'a>>(name: &str, mut args: Vec<XPathValue<N>>) -> FuncResult<N> {
    arity(name, &args, 1, 1)?;
    let nodes = node_set_arg(name, args.remove(0))?;
    Ok(XPathValue::Number(nodes.len() as f64))
}

fn func_name<'a, N: DataSourceNode<'a>>(
    name: &str,
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
    local: bool,
) -> FuncResult<N> {
    arity(name, &args, 0, 1)?;
    let target = if args.is_empty() {
        Some(e_ctx.context_node)
    } else {
        node_set_arg(name, args.remove(0))?.into_iter().next()
    };
    let result = target
        .and_then(|node| node.name())
        .map(|q_name| {
            if local {
                q_name.local_part.to_string()
            } else {
                q_name.to_string()
            }
        })
        .unwrap_or_default();
    Ok(XPathValue::String(result))
}

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// `lang(s)`: the nearest `xml:lang` on the context node or an ancestor equals `s`, or
/// starts with `s` followed by `-`, ignoring case.
fn func_lang<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> FuncResult<N> {
    arity(name, &args, 1, 1)?;
    let wanted = args[0].to_string().to_ascii_lowercase();
    let is_xml_lang = |attr: &N| {
        attr.name().is_some_and(|q| {
            q.local_part == "lang"
                && (q.prefix == Some("xml") || attr.namespace_uri() == Some(XML_NAMESPACE))
        })
    };
    let mut current = Some(e_ctx.context_node);
    while let Some(node) = current {
        if let Some(attr) = node.attributes().find(is_xml_lang) {
            let lang = attr.string_value().to_ascii_lowercase();
            let matches = lang
                .strip_prefix(&wanted)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'));
            return Ok(XPathValue::Boolean(matches));
        }
        current = node.parent();
    }
    Ok(XPathValue::Boolean(false))
}

fn func_concat<'a, N: DataSourceNode<'a>>(name: &str, args: Vec<XPathValue<N>>) -> FuncResult<N> {
    if args.len() < 2 {
        return Err(XPathError::function(name, "Expected at least 2 arguments"));
    }
    Ok(XPathValue::String(
        args.iter().map(|a| a.to_string()).collect(),
    ))
}

fn func_substring<'a, N: DataSourceNode<'a>>(name: &str, args: Vec<XPathValue<N>>) -> FuncResult<N> {
    arity(name, &args, 2, 3)?;
    let s = args[0].to_string();
    let start = xpath_round(args[1].to_number());
    let end = match args.get(2) {
        Some(len) => start + xpath_round(len.to_number()),
        None => f64::INFINITY,
    };
    // Character positions are 1-based; NaN bounds select nothing.
    let result: String = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (*i + 1) as f64;
            pos >= start && pos < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}

fn func_translate<'a, N: DataSourceNode<'a>>(name: &str, args: Vec<XPathValue<N>>) -> FuncResult<N> {
    arity(name, &args, 3, 3)?;
    let s = args[0].to_string();
    let from: Vec<char> = args[1].to_string().chars().collect();
    let to: Vec<char> = args[2].to_string().chars().collect();
    let result = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(result))
}

fn func_sum<'a, N: DataSourceNode<'a>>(name: &str, mut args: Vec<XPathValue<N>>) -> FuncResult<N> {
    arity(name, &args, 1, 1)?;
    let nodes = node_set_arg(name, args.remove(0))?;
    let total = nodes
        .iter()
        .map(|n| string_to_number(&n.string_value()))
        .sum();
    Ok(XPathValue::Number(total))
}

fn unary_number<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    f: fn(f64) -> f64,
) -> FuncResult<N> {
    arity(name, &args, 1, 1)?;
    Ok(XPathValue::Number(f(args[0].to_number())))
}

/// XPath `round()`: halves round towards positive infinity.
fn xpath_round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
