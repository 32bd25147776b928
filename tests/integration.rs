//! Integration tests for ChurnForge

use churnforge::predict::{predict_customer, PredictionForm};
use churnforge::{
    evaluate, load_customer_data, pipeline, ConfusionMatrix, EncodingSchema, FeatureEncoder,
    ModelArtifact, PipelineConfig, RawTable, Record, SchemaBuilder,
};
use std::io::{Cursor, Write};
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,\
MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,\
StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,\
TotalCharges,Churn";

/// Create a Telco-shaped CSV with 40 customers; row 3 has a blank TotalCharges.
fn create_test_csv() -> NamedTempFile {
    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    let payments = [
        "Electronic check",
        "Mailed check",
        "Bank transfer (automatic)",
        "Credit card (automatic)",
    ];

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for i in 0..40usize {
        let churn = i % 3 == 0;
        let phone = i % 6 != 0;
        let internet = ["DSL", "Fiber optic", "No"][i % 3];
        let addon = |flip: usize| {
            if internet == "No" {
                "No internet service"
            } else {
                yes_no((i / 2 + flip) % 2 == 0)
            }
        };
        let tenure = if churn { i % 7 + 1 } else { 20 + i };
        let monthly = 20.0 + ((i * 7) % 80) as f64 + 0.35;
        let total = if i == 3 {
            " ".to_string()
        } else {
            format!("{:.2}", monthly * tenure as f64)
        };
        let contract = if churn {
            "Month-to-month"
        } else {
            ["One year", "Two year", "Month-to-month"][i % 3]
        };

        writeln!(
            file,
            "{:04}-TEST,{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.2},{},{}",
            i,
            ["Male", "Female"][i % 2],
            (i % 5 == 0) as u8,
            yes_no(i % 3 == 1),
            yes_no(i % 4 == 0),
            tenure,
            yes_no(phone),
            if phone { yes_no(i % 2 == 0) } else { "No phone service" },
            internet,
            addon(0),
            addon(1),
            addon(0),
            addon(1),
            addon(0),
            addon(1),
            contract,
            yes_no(i % 2 == 0),
            payments[i % 4],
            monthly,
            total,
            yes_no(churn),
        )
        .unwrap();
    }
    file
}

fn sample_customer() -> Record {
    serde_json::from_str(
        r#"{
            "gender": "Female", "SeniorCitizen": 0, "Partner": "Yes", "Dependents": "No",
            "tenure": 5, "PhoneService": "Yes", "MultipleLines": "No", "InternetService": "DSL",
            "OnlineSecurity": "Yes", "OnlineBackup": "No", "DeviceProtection": "Yes",
            "TechSupport": "No", "StreamingTV": "No", "StreamingMovies": "No",
            "Contract": "Month-to-month", "PaperlessBilling": "Yes",
            "PaymentMethod": "Electronic check", "MonthlyCharges": 70.35, "TotalCharges": 350.5
        }"#,
    )
    .unwrap()
}

fn train_on_fixture() -> pipeline::TrainingOutcome {
    let file = create_test_csv();
    let data = load_customer_data(file.path().to_str().unwrap()).unwrap();
    pipeline::train(&data.table, &PipelineConfig::default()).unwrap()
}

#[test]
fn test_end_to_end_pipeline() {
    let outcome = train_on_fixture();
    let schema = &outcome.artifact.schema;

    assert_eq!(outcome.dropped_rows, 1);
    assert_eq!(outcome.train_rows + outcome.test_rows, 39);
    assert!(!schema.columns().iter().any(|c| c == "customerID" || c == "Churn"));
    assert!(schema.columns().contains(&"tenure".to_string()));
    assert!(schema.columns().contains(&"InternetService_No".to_string()));
    // DSL is the lexicographically first category and therefore the reference
    assert!(!schema.columns().contains(&"InternetService_DSL".to_string()));

    let report = &outcome.report;
    assert_eq!(report.confusion.total(), outcome.test_rows);
    assert!((0.0..=1.0).contains(&report.accuracy));
}

#[test]
fn test_prediction_after_reload() {
    let outcome = train_on_fixture();
    let dir = tempdir().unwrap();
    let path = dir.path().join("churn_model.json");
    outcome.artifact.save(&path).unwrap();

    let artifact = ModelArtifact::load(&path).unwrap();
    let prediction = predict_customer(&artifact, &sample_customer()).unwrap();
    assert!(prediction.label == "Yes" || prediction.label == "No");
    let p = prediction.churn_probability.unwrap();
    assert!((0.0..=1.0).contains(&p));

    // Churners are the minority in the fixture; their score must still be P(churn).
    let mut loyal = sample_customer();
    loyal.insert("tenure", 60i64);
    loyal.insert("Contract", "Two year");
    loyal.insert("TotalCharges", 4221.0);
    let mut churner = sample_customer();
    churner.insert("tenure", 1i64);
    churner.insert("TotalCharges", 70.35);

    let p_loyal = predict_customer(&artifact, &loyal).unwrap().churn_probability.unwrap();
    let p_churner = predict_customer(&artifact, &churner)
        .unwrap()
        .churn_probability
        .unwrap();
    assert!(p_churner > p_loyal, "churner {} vs loyal {}", p_churner, p_loyal);

    let encoded = FeatureEncoder::new(&artifact.schema)
        .encode(&sample_customer())
        .unwrap();
    assert_eq!(encoded.len(), artifact.schema.len());
}

#[test]
fn test_artifact_schema_drift_is_rejected() {
    let outcome = train_on_fixture();
    let dir = tempdir().unwrap();
    let path = dir.path().join("churn_model.json");
    outcome.artifact.save(&path).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json["schema"]["columns"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::Value::from("Contract_Three year"));
    std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    assert!(ModelArtifact::load(&path).is_err());
}

#[test]
fn test_invalid_record_does_not_stop_prediction() {
    let outcome = train_on_fixture();
    let artifact = &outcome.artifact;

    let mut missing = sample_customer();
    missing.remove("TotalCharges");
    assert!(predict_customer(artifact, &missing).is_err());

    assert!(predict_customer(artifact, &sample_customer()).is_ok());
}

#[test]
fn test_interactive_form_recovers_from_bad_input() {
    let outcome = train_on_fixture();
    let answers = [
        "Female", "No", "Yes", "No", "abc", "5", "Yes", "No", "DSL", "Yes", "No", "Yes", "No",
        "No", "No", "1", "Yes", "Electronic check", "70.35", "350.5", "q",
    ];
    let input = Cursor::new(answers.join("\n"));
    let mut output = Vec::new();

    let count = PredictionForm::new(&outcome.artifact, input, &mut output)
        .run()
        .unwrap();
    let text = String::from_utf8(output).unwrap();

    assert_eq!(count, 1);
    assert!(text.contains("✗"));
    assert!(text.contains("Churn Prediction"));
    assert!(text.contains("Goodbye."));
}

fn table(columns: &[&str], rows: Vec<Record>) -> RawTable {
    RawTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

#[test]
fn test_binary_attribute_scenario() {
    let reference = table(
        &["gender", "tenure", "Churn"],
        vec![
            Record::new().with("gender", "Male").with("tenure", 10.0).with("Churn", "No"),
            Record::new().with("gender", "Female").with("tenure", 2.0).with("Churn", "Yes"),
        ],
    );
    let schema = SchemaBuilder::new("Churn")
        .categorical(["gender"])
        .build(&reference)
        .unwrap();
    assert_eq!(schema.columns(), &["gender".to_string(), "tenure".to_string()]);

    let record = Record::new().with("gender", "Female").with("tenure", 5.0);
    let encoded = FeatureEncoder::new(&schema).encode(&record).unwrap();
    assert_eq!(encoded, vec![0.0, 5.0]);
    assert_eq!(schema.decode_binary("gender", encoded[0]), Some("Female"));
}

fn contract_schema() -> EncodingSchema {
    let reference = table(
        &["Contract", "Churn"],
        ["Month-to-month", "One year", "Two year", "Month-to-month"]
            .iter()
            .zip(["Yes", "No", "No", "Yes"])
            .map(|(c, y)| Record::new().with("Contract", *c).with("Churn", y))
            .collect(),
    );
    SchemaBuilder::new("Churn")
        .categorical(["Contract"])
        .reference("Contract", "Two year")
        .build(&reference)
        .unwrap()
}

#[test]
fn test_multi_value_attribute_scenario() {
    let schema = contract_schema();
    assert_eq!(
        schema.columns(),
        &["Contract_Month-to-month".to_string(), "Contract_One year".to_string()]
    );

    let encoder = FeatureEncoder::new(&schema);
    let two_year = Record::new().with("Contract", "Two year");
    assert_eq!(encoder.encode(&two_year).unwrap(), vec![0.0, 0.0]);

    let one_year = Record::new().with("Contract", "One year");
    assert_eq!(encoder.encode(&one_year).unwrap(), vec![0.0, 1.0]);
}

#[test]
fn test_encoding_properties() {
    let schema = contract_schema();
    let encoder = FeatureEncoder::new(&schema);

    let record = Record::new()
        .with("Contract", "Month-to-month")
        .with("Extra", "ignored");
    let reordered = Record::new()
        .with("Extra", "ignored")
        .with("Contract", "Month-to-month");

    let first = encoder.encode(&record).unwrap();
    assert_eq!(first.len(), schema.len());
    assert_eq!(first, encoder.encode(&record).unwrap());
    assert_eq!(first, encoder.encode(&reordered).unwrap());

    let unseen = Record::new().with("Contract", "Three year");
    assert_eq!(encoder.encode(&unseen).unwrap(), vec![0.0, 0.0]);
}

#[test]
fn test_confusion_matrix_scenario() {
    let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap();
    assert_eq!(report.accuracy, 0.75);
    assert_eq!(
        report.confusion,
        ConfusionMatrix {
            true_positive: 2,
            false_positive: 1,
            true_negative: 1,
            false_negative: 0,
        }
    );
}
