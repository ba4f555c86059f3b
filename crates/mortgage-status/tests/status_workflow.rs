use mortgage_status::table::Value;
use mortgage_status::workflows::mortgage::{
    profile_inputs, ClassificationPipeline, CsvDatasetLoader, CsvResultSink, DatasetProfile,
    DatasetReaders, EligibilityConfig, ExploratoryQuery, PipelineOptions,
};

const APPLICATIONS: &str = "\
Numéro_demande_de_prêt,Numéro_client,Date_de_demande,Numéro_agence,Montant_opération,Durée,Accord
101,1,2019-04-02,12,250000,240,O
102,2,2020-02-17,12,180000,180,N
103,3,2021-09-09,14,150000,300,
";

const BRANCHES: &str = "\
Numéro_agence,Ville
12,Bordeaux
14,Nantes
";

const PROFESSIONAL_STATUS: &str = "\
Numéro_client,Catégorie_socioprofessionnelle,Statut_emploi,Régularité_des_revenus,Revenu_mensuel_moyen
1,Cadre,CDI,1 : Réguliers,4000
2,Artisan,Indépendant,3 : Très irréguliers,6000
3,Employé,CDI,2 : Irréguliers,2500
";

const DOWN_PAYMENTS: &str = "\
Numéro_demande_de_prêt,Apport
101,50000
102,30000
";

const FAMILY_STATUS: &str = "\
Numéro_client,Date_de_naissance,Nombre_enfants_à_charge
1,1975-06-30,2
2,1988-01-15,0
3,1960-03-03,1
";

fn load() -> mortgage_status::workflows::mortgage::MortgageDatasets {
    CsvDatasetLoader::from_readers(DatasetReaders {
        applications: APPLICATIONS.as_bytes(),
        branches: BRANCHES.as_bytes(),
        professional_status: PROFESSIONAL_STATUS.as_bytes(),
        down_payments: DOWN_PAYMENTS.as_bytes(),
        family_status: FAMILY_STATUS.as_bytes(),
    })
    .expect("datasets load")
}

#[test]
fn classifies_applications_from_french_exports() {
    let datasets = load();
    let pipeline =
        ClassificationPipeline::new(EligibilityConfig::default(), PipelineOptions::default());

    let classified = pipeline.run(&datasets).expect("pipeline succeeds");

    let ids: Vec<Option<i64>> = classified
        .column("application_id")
        .expect("column")
        .map(Value::as_int)
        .collect();
    let statuses: Vec<Option<&str>> = classified
        .column("status")
        .expect("column")
        .map(Value::as_text)
        .collect();

    // 102: very irregular income. 103: 2021 - 1960 + 25 = 86 at maturity.
    assert_eq!(ids, vec![Some(102), Some(103), Some(101)]);
    assert_eq!(
        statuses,
        vec![Some("refused"), Some("refused"), Some("accepted")]
    );
}

#[test]
fn persists_output_as_csv() {
    let datasets = load();
    let classified =
        ClassificationPipeline::new(EligibilityConfig::default(), PipelineOptions::default())
            .run(&datasets)
            .expect("pipeline succeeds");

    let mut buffer = Vec::new();
    CsvResultSink::write_to(&classified, &mut buffer).expect("csv written");
    let csv = String::from_utf8(buffer).expect("utf8");

    let mut lines = csv.lines();
    let header = lines.next().expect("header");
    assert!(header.starts_with("application_id,client_id,request_date"));
    assert!(header.ends_with("status,status_reason"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn profiles_every_input_dataset() {
    let datasets = load();

    let profiles: Vec<DatasetProfile> = profile_inputs(&datasets);

    assert_eq!(profiles.len(), 5);
    let applications = &profiles[0];
    assert_eq!(applications.rows, 3);
    let decision = applications.column("decision").expect("profiled");
    assert_eq!(decision.null_count, 1);
    assert_eq!(decision.distinct, 2);
}

#[test]
fn exploratory_queries_run_over_loaded_data() {
    let datasets = load();

    let granted = ExploratoryQuery::GrantedApplications
        .run(&datasets, &EligibilityConfig::default())
        .expect("query succeeds");

    assert_eq!(granted.len(), 1);
    assert_eq!(
        granted.value(0, "application_id").expect("column"),
        Some(&Value::Int(101))
    );
}
