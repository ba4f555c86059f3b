use mortgage_status::config::AppConfig;
use mortgage_status::error::AppError;
use mortgage_status::telemetry;
use mortgage_status::workflows::mortgage::{
    profile_inputs, ClassificationPipeline, CsvDatasetLoader, CsvResultSink, DatasetLoader,
    DatasetProfile, EligibilityConfig, ExploratoryQuery, MortgageDatasets, ReportWriter,
    ResultSink,
};
use tracing::info;

pub(crate) fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let loader = CsvDatasetLoader::new(config.datasets.clone());
    info!(?config.environment, data = ?loader.paths(), "starting classification run");
    let datasets = loader.load()?;

    let reports = ReportWriter::new(&config.output.report_dir);
    for profile in profile_inputs(&datasets) {
        reports.write(&profile)?;
    }

    print!("{}", render_inputs(&datasets));

    let pipeline = ClassificationPipeline::new(config.eligibility.clone(), config.pipeline);
    print_queries(&datasets, pipeline.eligibility())?;

    info!(options = ?pipeline.options(), "classifying applications");
    let classified = pipeline.run(&datasets)?;
    println!("\nMortgage applications status\n{classified}");

    let sink = CsvResultSink::new(&config.output.classified_csv);
    sink.persist(&classified)?;
    reports.write(&DatasetProfile::of("Mortgage applications status", &classified))?;

    info!(
        output = %sink.path().display(),
        applications = classified.len(),
        "classification run complete"
    );
    Ok(())
}

fn render_inputs(datasets: &MortgageDatasets) -> String {
    datasets
        .tables()
        .iter()
        .map(|table| format!("\n{}\n{table}\n", table.name()))
        .collect()
}

fn print_queries(
    datasets: &MortgageDatasets,
    eligibility: &EligibilityConfig,
) -> Result<(), AppError> {
    for (position, query) in ExploratoryQuery::ALL.into_iter().enumerate() {
        let table = query.run(datasets, eligibility)?;
        println!("\nQuery {}: {}\n{table}", position + 1, query.title());
    }
    Ok(())
}
