use gridplan::config::Config;
use schemars::schema_for;

pub fn execute() -> anyhow::Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}

fn config_schema() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&schema_for!(Config))
}
