use std::io::Write;

use idtable_core::Caller;
use idtable_router::Router;

pub fn init(router: &Router, out: &mut impl Write) -> anyhow::Result<()> {
    router.init()?;
    writeln!(out, "✓ UserIdentity table created")?;
    Ok(())
}

pub fn invoke(
    router: &Router,
    caller: &Caller,
    name: &str,
    args: &[String],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    router.invoke_as(caller, name, args)?;
    writeln!(out, "✓ {name} done")?;
    Ok(())
}

/// Print the query result. Non-UTF-8 values are printed lossily.
pub fn query(
    router: &Router,
    caller: &Caller,
    name: &str,
    args: &[String],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let value = router.query_as(caller, name, args)?;
    writeln!(out, "{}", String::from_utf8_lossy(&value))?;
    Ok(())
}

pub fn schema(router: &Router, out: &mut impl Write) -> anyhow::Result<()> {
    let schema = router.table().schema()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&schema)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idtable_core::config::RouterConfig;
    use idtable_state::StateTable;

    fn router() -> Router {
        Router::new(StateTable::open_in_memory().unwrap(), RouterConfig::default())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn invoke_and_query_print_results() {
        let router = router();
        let caller = Caller::anonymous();
        let mut out = Vec::new();

        init(&router, &mut out).unwrap();
        invoke(&router, &caller, "create", &args(&["alice"]), &mut out).unwrap();
        query(&router, &caller, "query", &args(&["alice"]), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "✓ UserIdentity table created\n✓ create done\ntrue\n"
        );
    }

    #[test]
    fn router_errors_propagate() {
        let router = router();
        let caller = Caller::anonymous();
        let mut out = Vec::new();

        init(&router, &mut out).unwrap();
        let err = query(&router, &caller, "query", &args(&["ghost"]), &mut out).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn schema_prints_columns() {
        let router = router();
        let mut out = Vec::new();
        assert!(schema(&router, &mut out).is_err());

        router.init().unwrap();
        schema(&router, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"relation\": \"UserIdentity\""));
        assert!(text.contains("\"Status\""));
    }
}
