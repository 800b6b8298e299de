use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use tax_optimizer_core::tax::{
    TaxComputationInput, TaxConfig, TaxEngine, TaxOptimizationInput, TaxProfile,
};

use crate::input;

/// Arguments for the single-income commands (slab tax, marginal rate)
#[derive(Args)]
pub struct IncomeArgs {
    /// Annual gross income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Path to JSON input file with `income` (overrides --income)
    #[arg(long)]
    pub input: Option<String>,

    /// Tax configuration file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

/// Arguments shared by the request-based commands
#[derive(Args)]
pub struct RequestArgs {
    /// Path to JSON request (income, filing_status, deductions, profile)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual gross income, when no request file is given
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Taxpayer age, when no request file is given
    #[arg(long)]
    pub age: Option<u32>,

    /// Filing status passed through to the report
    #[arg(long, default_value = "individual")]
    pub filing_status: String,

    /// Tax configuration file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_tax(args: IncomeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = computation_input(args.income, args.input.as_deref())?;
    let engine = build_engine(args.config.as_deref(), request.config)?;
    let result = engine.calculate_tax(request.income)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_marginal_rate(args: IncomeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = computation_input(args.income, args.input.as_deref())?;
    let engine = build_engine(args.config.as_deref(), request.config)?;
    let result = engine.resolve_marginal_rate(request.income)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_strategies(args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (engine, request) = prepare_request(args)?;
    let result = engine.recommend_strategies(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_report(args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (engine, request) = prepare_request(args)?;
    let result = engine.optimize(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_checklist(args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (engine, request) = prepare_request(args)?;
    let result = engine.document_checklist(&request.profile)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_default_config() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(TaxConfig::default())?)
}

fn computation_input(
    income: Option<Decimal>,
    path: Option<&str>,
) -> Result<TaxComputationInput, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_json(path);
    }
    if let Some(income) = income {
        return Ok(TaxComputationInput {
            income,
            config: None,
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("--income <amount>, --input <file.json> or stdin required".into())
}

fn prepare_request(
    args: RequestArgs,
) -> Result<(TaxEngine, TaxOptimizationInput), Box<dyn std::error::Error>> {
    let mut request: TaxOptimizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(income) = args.income {
        TaxOptimizationInput {
            income,
            filing_status: args.filing_status.clone(),
            deductions: Vec::new(),
            profile: args.age.map(TaxProfile::with_age).unwrap_or_default(),
            config: None,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, --income <amount> or stdin required".into());
    };

    if let Some(age) = args.age {
        request.profile.age = age;
    }

    let engine = build_engine(args.config.as_deref(), request.config.take())?;
    Ok((engine, request))
}

/// `--config` wins over a config embedded in the request.
fn build_engine(
    config_path: Option<&str>,
    embedded: Option<TaxConfig>,
) -> Result<TaxEngine, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => input::file::read_config(path)?,
        None => embedded.unwrap_or_default(),
    };
    Ok(TaxEngine::new(config)?)
}
