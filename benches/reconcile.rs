//! Benchmarks for reduction and reconciliation on realistic candidate sets

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fiche::audit::audit;
use fiche::reconcile::reconcile;
use fiche::record::{CandidateRow, CandidateSet, FieldValue, Scalar, Source};
use fiche::reduce::{reduce, FirstOption};

const DPE_FIELDS: [&str; 6] = [
    "numero_dpe",
    "etiquette_dpe",
    "etiquette_ges",
    "surface_habitable_logement",
    "annee_construction",
    "type_energie",
];

const DVF_FIELDS: [&str; 3] = [
    "surface_reelle_bati",
    "nombre_pieces_principales",
    "surface_terrain",
];

fn diagnostics(n: usize) -> CandidateSet {
    let rows = (0..n)
        .map(|i| {
            CandidateRow::new(Source::Dpe)
                .with("numero_dpe", format!("2280E{:08}", i).as_str())
                .with("etiquette_dpe", ["C", "D", "E"][i % 3])
                .with("etiquette_ges", ["B", "C"][i % 2])
                .with("surface_habitable_logement", 40.0 + (i % 4) as f64 * 12.5)
                .with("annee_construction", 1950 + (i % 5) as i64)
                .with(
                    "type_energie",
                    FieldValue::List(vec![Scalar::from("Gaz naturel"), Scalar::from("Électricité")]),
                )
        })
        .collect();
    CandidateSet::from_rows(Source::Dpe, rows)
}

fn transactions(n: usize) -> CandidateSet {
    let rows = (0..n)
        .map(|i| {
            CandidateRow::new(Source::Dvf)
                .with("date_mutation", FieldValue::from_cell(&format!("20{:02}-06-30", 10 + i % 10)))
                .with("surface_reelle_bati", 60 + (i % 3) as i64 * 10)
                .with("nombre_pieces_principales", 3i64)
                .with("surface_terrain", FieldValue::Null)
        })
        .collect();
    CandidateSet::from_rows(Source::Dvf, rows)
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_first_option");
    for n in [2usize, 10, 100] {
        let set = diagnostics(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &set, |b, set| {
            b.iter(|| {
                reduce(
                    black_box(set.clone()),
                    &["surface_habitable_logement", "numero_dpe"],
                    &mut FirstOption,
                )
            });
        });
    }
    group.finish();
}

fn bench_reconcile_and_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_audit");
    for n in [1usize, 10, 100] {
        let dpe = diagnostics(n);
        let dvf = transactions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(dvf, dpe), |b, (dvf, dpe)| {
            b.iter(|| {
                let record = reconcile(black_box(dvf), black_box(dpe), &DVF_FIELDS, &DPE_FIELDS);
                let usage = audit(&record, dpe, Source::Dpe);
                black_box((record, usage))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce, bench_reconcile_and_audit);
criterion_main!(benches);
