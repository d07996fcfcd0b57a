use kira_mirtop::core::error::ReportError;
use kira_mirtop::core::model::{ISOMIR_PERC, ISOMIR_SUM, READ_COUNT, REF_MIRNA_SUM};
use kira_mirtop::core::parse::ReportParser;
use proptest::prelude::*;

fn report(sample: &str, isomir: f64, reference: f64) -> String {
    format!("x,category,{sample},0\nx,isomiR_sum,{sample},{isomir}\nx,ref_miRNA_sum,{sample},{reference}\n")
}

proptest! {
    #[test]
    fn read_count_is_exact_sum(isomir in 0.0f64..1e12, reference in 0.0f64..1e12) {
        prop_assume!(isomir + reference > 0.0);
        let parsed = ReportParser::new()
            .parse(&report("s", isomir, reference))
            .expect("valid report")
            .expect("record emitted");
        let r = parsed.record;
        let iso = r.get(ISOMIR_SUM).unwrap();
        let refs = r.get(REF_MIRNA_SUM).unwrap();
        prop_assert_eq!(r.get(READ_COUNT).unwrap(), iso + refs);
    }

    #[test]
    fn percentage_is_bounded(isomir in 0u32..1_000_000, reference in 0u32..1_000_000) {
        prop_assume!(isomir as u64 + reference as u64 > 0);
        let parsed = ReportParser::new()
            .parse(&report("s", isomir as f64, reference as f64))
            .unwrap()
            .unwrap();
        let perc = parsed.record.get(ISOMIR_PERC).unwrap();
        prop_assert!((0.0..=100.0).contains(&perc), "perc {} out of range", perc);
    }

    #[test]
    fn header_rows_never_contribute(sample in "[A-Za-z0-9_]{1,12}", value in "[^,\n\r]{0,10}") {
        let text = format!(
            "x,category,{sample},{value}\nx,isomiR_sum,{sample},1\nx,ref_miRNA_sum,{sample},1\n"
        );
        let parsed = ReportParser::new().parse(&text).unwrap().unwrap();
        prop_assert!(!parsed.record.contains("category"));
        prop_assert_eq!(parsed.record.len(), 4);
    }
}

#[test]
fn missing_reference_is_reported_even_with_other_metrics() {
    let text = "x,isomiR_sum,s,5\nx,isomiR_add3p,s,2\nx,isomiR_shift,s,1\n";
    assert_eq!(
        ReportParser::new().parse(text),
        Err(ReportError::MissingField(REF_MIRNA_SUM))
    );
}
