use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use transaction_health::*;

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    write!(file, "{}", contents)?;
    Ok(path)
}

fn registry_table() -> RawTable {
    let mut t = RawTable::with_headers(
        "registry",
        vec!["ID".to_string(), "DT_REFE".to_string(), "DT_ABRT".to_string()],
    );
    t.push_row(vec![
        "1".to_string(),
        "2024-01-15".to_string(),
        "2019-05-02".to_string(),
    ]);
    t.push_row(vec![
        "2".to_string(),
        "2024-02-15".to_string(),
        String::new(),
    ]);
    t.push_row(vec![
        "3".to_string(),
        "2024-03-15".to_string(),
        "invalid".to_string(),
    ]);
    t
}

fn transactions_table() -> RawTable {
    let mut t = RawTable::with_headers(
        "transactions",
        vec![
            "ID_PGTO".to_string(),
            "ID_RCBE".to_string(),
            "DT_REFE".to_string(),
            "VL".to_string(),
            "DS_TRAN".to_string(),
        ],
    );
    for (pgto, rcbe, date, vl, tran) in [
        ("1", "2", "2024-01-20", "150,0", "pix"),
        ("2", "1", "2024-02-05", "80", "ted"),
        ("3", "1", "2024-02-07", "999,5", "boleto"),
        ("2", "3", "2024-03-01", "10", "pix"),
    ] {
        t.push_row(vec![
            pgto.to_string(),
            rcbe.to_string(),
            date.to_string(),
            vl.to_string(),
            tran.to_string(),
        ]);
    }
    t
}

const SUMMARY_CSV: &str = "\u{feff}ID;setor_cnae;momento_empresa;total_recebido;total_pago;fluxo_caixa_liquido;ticket_medio_recebido;ticket_medio_pago\n\
1;comércio;declínio;100,5;150,5;-50;10,05;15,05\n\
2;serviços;início;200;120;80;20;12\n\
3;comércio;declínio;50;90;-40;5;9\n";

const NETWORK_CSV: &str = "ID;Centralidade_de_Conexoes;Centralidade_de_Ponte;Grupo_Empresas\n\
1;0,9;0,1;G1\n\
3;0,2;0,05;G2\n";

fn load_fixture_data(dir: &tempfile::TempDir) -> Result<DashboardData> {
    let summary_path = write_fixture(dir, "dados_para_powerbi.csv", SUMMARY_CSV)?;
    let network_path = write_fixture(dir, "dados_rede_para_powerbi.csv", NETWORK_CSV)?;

    let summary = ingestion::read_delimited(&summary_path)?;
    let network = ingestion::read_delimited(&network_path)?;
    Ok(build_dashboard_data(
        registry_table(),
        transactions_table(),
        summary,
        network,
    )?)
}

#[test]
fn test_load_join_clean_calendar() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let data = load_fixture_data(&dir)?;

    // Join preserved base cardinality and attached optional columns.
    assert_eq!(data.companies.len(), 3);
    let first = &data.companies[0];
    assert_eq!(first.id_empresa, "1");
    assert_eq!(first.setor_cnae, "COMÉRCIO");
    assert_eq!(first.momento_empresa, "DECLÍNIO");
    assert_eq!(first.total_recebido, 100.5);
    assert_eq!(first.centralidade_conexoes, 0.9);
    assert_eq!(first.grupo_empresas.as_deref(), Some("G1"));
    assert_eq!(first.dt_refe, chrono::NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(first.dt_abrt, chrono::NaiveDate::from_ymd_opt(2019, 5, 2));

    // Company 2 has no network row; company 3's opening date was malformed.
    assert_eq!(data.companies[1].centralidade_conexoes, 0.0);
    assert!(data.companies[1].grupo_empresas.is_none());
    assert!(data.companies[2].dt_abrt.is_none());

    // Calendar covers 2024-01-15 through 2024-03-15, one row per day.
    let expected_days = (chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        - chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    .num_days()
        + 1;
    assert_eq!(data.calendar.len(), expected_days as usize);
    assert_eq!(
        month_options(&data.calendar),
        vec!["01/2024", "02/2024", "03/2024"]
    );
    Ok(())
}

#[test]
fn test_filtered_aggregations() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let data = load_fixture_data(&dir)?;

    let selection = FilterSelection {
        momento: Some("DECLÍNIO".to_string()),
        ..Default::default()
    };
    let view = selection.apply(&data);
    assert_eq!(view.companies.len(), 2);

    let kpis = GlobalKpis::compute(&view.companies);
    assert_eq!(kpis.total_recebido, 150.5);
    assert_eq!(kpis.empresas_declinio, 2);
    assert_eq!(kpis.empresas_inicio, 0);

    let ratio = monthly_ratio(&view.companies, Metric::TotalRecebido, Metric::TotalPago);
    assert_eq!(ratio.len(), 2);
    assert!((ratio[0].ratio.unwrap() - 100.5 / 150.5).abs() < 1e-9);

    let mix = sum_by_transaction_type(&data.transactions);
    assert_eq!(mix[0].label, "BOLETO");
    assert_eq!(mix[0].value, 999.5);
    Ok(())
}

#[test]
fn test_drilldown_and_streaks() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let data = load_fixture_data(&dir)?;

    let snapshot = CompanySnapshot::from_records("1", &data.companies).unwrap();
    assert_eq!(snapshot.momento_empresa, "DECLÍNIO");
    assert_eq!(snapshot.fluxo_caixa_liquido, -50.0);

    let mine = transactions_for(&data.transactions, "1");
    assert_eq!(mine.len(), 3);
    let edges = top_edges(&data.transactions, "1", 2);
    assert_eq!(edges[0].valor, 999.5);
    assert_eq!(edges[1].valor, 150.0);

    let matrix = CashFlowMatrix::from_records(&data.companies);
    // Three distinct months across the unified table; each company reports
    // once, so missing months are zero-filled and streaks are 1 at most.
    assert_eq!(matrix.months.len(), 3);
    let streaks = matrix.negative_streaks();
    assert!(streaks
        .iter()
        .all(|s| s.streak_months <= 1));
    Ok(())
}

#[test]
fn test_export_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let data = load_fixture_data(&dir)?;

    let export_path = dir.path().join("dados_filtrados.csv");
    export_to_path(&export_path, &data.companies)?;

    let exported = ingestion::read_delimited(&export_path)?;
    assert_eq!(exported.row_count(), data.companies.len());
    assert!(exported.has_column("id_empresa"));
    assert!(exported.has_column("Grupo_Empresas"));
    // Comma decimals on the way out, re-readable on the way in.
    assert_eq!(exported.cell(&exported.rows[0].clone(), "total_recebido"), "100,5");
    Ok(())
}

#[test]
fn test_missing_input_file_is_fatal() {
    let files = InputFiles {
        registry: PathBuf::from("/nonexistent/Base1_ID.xlsx"),
        transactions: PathBuf::from("/nonexistent/Base2_Transacoes.xlsx"),
        summary: PathBuf::from("/nonexistent/dados_para_powerbi.csv"),
        network: PathBuf::from("/nonexistent/dados_rede_para_powerbi.csv"),
    };
    assert!(matches!(
        load_dashboard_data(&files),
        Err(AnalyticsError::MissingInput(_))
    ));
    assert!(matches!(
        fingerprint_inputs(&files),
        Err(AnalyticsError::MissingInput(_))
    ));
}

#[test]
fn test_fingerprint_tracks_content() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let a = write_fixture(&dir, "a.xlsx", "registry-bytes")?;
    let b = write_fixture(&dir, "b.xlsx", "transaction-bytes")?;
    let c = write_fixture(&dir, "c.csv", SUMMARY_CSV)?;
    let d = write_fixture(&dir, "d.csv", NETWORK_CSV)?;

    let files = InputFiles {
        registry: a,
        transactions: b,
        summary: c.clone(),
        network: d,
    };

    let before = fingerprint_inputs(&files)?;
    assert_eq!(before, fingerprint_inputs(&files)?);

    std::fs::write(&c, "ID;total_recebido\n9;1\n")?;
    assert_ne!(before, fingerprint_inputs(&files)?);
    Ok(())
}

#[test]
fn test_session_cache_invalidate() {
    let mut cache = SessionCache::new();
    assert!(!cache.is_loaded());
    cache.invalidate();
    assert!(!cache.is_loaded());
}
