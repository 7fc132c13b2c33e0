use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::catalog::{catalog, help_for, Field};

pub fn run(field: Option<String>, value: Option<String>, json: bool) -> Result<()> {
    if let (Some(name), Some(value)) = (&field, &value) {
        let field = Field::from_str(name)?;
        let help = describe(field, value)?;
        if json {
            let out = json!({ "field": field.as_str(), "value": value.trim(), "help": help });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            println!("{}", help);
        }
        return Ok(());
    }

    let fields = match field {
        Some(name) => vec![Field::from_str(&name)?],
        None => Field::ALL.to_vec(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&fields))?);
        return Ok(());
    }

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}:", field);
        let width = catalog(*field).iter().map(|c| c.value.len()).max().unwrap_or(0);
        for choice in catalog(*field) {
            println!("  {:width$}  {}", choice.value, choice.help, width = width);
        }
    }
    Ok(())
}

/// Help for one value; free text outside the catalog is an error here.
fn describe(field: Field, value: &str) -> Result<&'static str> {
    match help_for(field, value) {
        Some(help) => Ok(help),
        None => bail!(
            "'{}' is not a listed {} (run `promptalpha catalog {}` to see the choices)",
            value.trim(),
            field,
            field.as_str()
        ),
    }
}

fn to_json(fields: &[Field]) -> Value {
    let mut out = serde_json::Map::new();
    for field in fields {
        let entries: Vec<Value> = catalog(*field)
            .iter()
            .map(|c| json!({ "value": c.value, "help": c.help }))
            .collect();
        out.insert(field.as_str().to_string(), Value::Array(entries));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_single_field() {
        let value = to_json(&[Field::Depth]);
        let depths = value["depth"].as_array().unwrap();
        assert_eq!(depths.len(), 3);
        assert_eq!(depths[2]["value"], "Deep Dive");
        assert!(value.get("role").is_none());
    }

    #[test]
    fn test_run_unknown_field() {
        let err = run(Some("flavour".to_string()), None, false).unwrap_err();
        assert!(err.to_string().contains("Unknown catalog field"));
    }

    #[test]
    fn test_describe_single_value() {
        assert_eq!(
            describe(Field::Tone, " Analytical ").unwrap(),
            "Data-aware, objective, structured."
        );
        let err = describe(Field::Tone, "grumpy").unwrap_err();
        assert!(err.to_string().contains("'grumpy' is not a listed"));
        assert!(run(Some("tone".to_string()), Some("grumpy".to_string()), false).is_err());
        assert!(run(Some("tone".to_string()), Some("neutral".to_string()), true).is_ok());
    }
}
