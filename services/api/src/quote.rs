use clap::Args;
use premium_estimator::error::AppError;
use premium_estimator::estimation::{
    quote_csv_path, BatchQuote, Categorical, QuotedApplicant, RawPredictionRequest,
};
use premium_estimator::telemetry;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct QuoteArgs {
    /// Applicant age in years
    #[arg(long)]
    pub(crate) age: Option<String>,
    /// Number of covered dependants
    #[arg(long)]
    pub(crate) dependants: Option<String>,
    /// Annual income in lakhs
    #[arg(long)]
    pub(crate) income: Option<String>,
    /// Genetical risk score (defaults to 0)
    #[arg(long)]
    pub(crate) genetical_risk: Option<String>,
    /// bronze | silver | gold
    #[arg(long)]
    pub(crate) insurance_plan: Option<String>,
    /// salaried | self-employed | freelancer | unemployed
    #[arg(long)]
    pub(crate) employment_status: Option<String>,
    #[arg(long)]
    pub(crate) gender: Option<String>,
    #[arg(long)]
    pub(crate) marital_status: Option<String>,
    /// underweight | normal | overweight | obese
    #[arg(long)]
    pub(crate) bmi_category: Option<String>,
    /// no-smoking | occasional | smoking
    #[arg(long)]
    pub(crate) smoking_status: Option<String>,
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// no-disease | diabetes | heart-disease | high-blood-pressure | thyroid
    #[arg(long)]
    pub(crate) medical_history: Option<String>,
    /// Quote every row of a CSV export instead (headers use the request field names)
    #[arg(long, conflicts_with_all = ["age", "dependants", "income"])]
    pub(crate) csv: Option<PathBuf>,
}

impl QuoteArgs {
    fn request(&self) -> RawPredictionRequest {
        RawPredictionRequest {
            age: self.age.clone(),
            dependants: self.dependants.clone(),
            income: self.income.clone(),
            genetical_risk: self.genetical_risk.clone(),
            insurance_plan: self.insurance_plan.clone(),
            employment_status: self.employment_status.clone(),
            gender: self.gender.clone(),
            marital_status: self.marital_status.clone(),
            bmi_category: self.bmi_category.clone(),
            smoking_status: self.smoking_status.clone(),
            region: self.region.clone(),
            medical_history: self.medical_history.clone(),
        }
    }
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    telemetry::init_cli()?;

    if let Some(path) = args.csv.as_ref() {
        let quotes = quote_csv_path(path)?;
        print!("{}", render_batch(&quotes));
        return Ok(());
    }

    let input = args.request().validate()?;
    print!("{}", render_quote(&QuotedApplicant::from_input(input)));
    Ok(())
}

pub(crate) fn render_quote(quote: &QuotedApplicant) -> String {
    let input = &quote.input;
    let mut out = String::new();

    let _ = writeln!(out, "Premium estimate");
    let _ = writeln!(
        out,
        "Applicant: age {} | {} dependant(s) | income {} lakhs | genetical risk {}",
        input.age, input.dependants, input.income_lakhs, input.genetical_risk
    );
    let _ = writeln!(
        out,
        "Plan {} | {} | {} | BMI {} | {} | {}",
        input.insurance_plan.label(),
        display_or(input.employment_status.label(), "Unemployed"),
        input.smoking_status.label(),
        input.bmi_category.label(),
        input.region.label(),
        input.medical_history.label()
    );

    let _ = writeln!(out, "\nBreakdown");
    for component in &quote.estimate.components {
        let _ = writeln!(out, "- {:<16} {:>8}", component.factor.label(), component.amount);
    }
    let _ = writeln!(out, "\nAnnual premium: {}", quote.estimate.premium);
    let _ = writeln!(out, "Monthly premium: {}", monthly(quote.estimate.premium));
    let _ = writeln!(out, "Health score: {}", quote.health_score);
    out
}

pub(crate) fn render_batch(quotes: &[BatchQuote]) -> String {
    let mut out = String::new();
    let mut quoted = 0usize;

    for quote in quotes {
        match &quote.outcome {
            Ok(applicant) => {
                quoted += 1;
                let _ = writeln!(
                    out,
                    "line {}: premium {} (monthly {}) | health score {} | plan {}",
                    quote.line,
                    applicant.estimate.premium,
                    monthly(applicant.estimate.premium),
                    applicant.health_score,
                    applicant.input.insurance_plan.label()
                );
            }
            Err(err) => {
                let _ = writeln!(out, "line {}: skipped ({})", quote.line, err);
            }
        }
    }

    let _ = writeln!(out, "{quoted} of {} row(s) quoted", quotes.len());
    out
}

fn monthly(annual: i64) -> i64 {
    (annual as f64 / 12.0).round() as i64
}

fn display_or<'a>(label: &'a str, fallback: &'a str) -> &'a str {
    if label.is_empty() {
        fallback
    } else {
        label
    }
}
