use std::{env, error::Error, fs, path::Path};

#[path = "build/config_gen.rs"]
mod config_gen;

const DEFAULT_CONFIG_PATH: &str = "cfg.toml";
const CONFIG_PATH_VAR: &str = "OPEN_MQTT_CHARGER_CFG";

fn main() -> Result<(), Box<dyn Error>> {
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    // Tell Cargo to rerun if the toml or its location changes
    println!("cargo:rerun-if-env-changed={CONFIG_PATH_VAR}");
    println!("cargo:rerun-if-changed={path}");
    println!("cargo:rerun-if-changed=build/config_gen.rs");

    let toml_str = fs::read_to_string(&path).map_err(|e| format!("failed to read {path}: {e}"))?;
    let code = config_gen::generate(&toml_str).map_err(|e| format!("invalid {path}: {e}"))?;

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, code)?;
    Ok(())
}
