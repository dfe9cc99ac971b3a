use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tiergrade_core::combine::merge;
use tiergrade_core::model::{GradingContext, GradingRule, RubricItem};
use tiergrade_core::pattern::Pattern;
use tiergrade_core::results::{AiJudgement, GradeResult};
use tiergrade_core::{GradingEngine, Tier};

fn describe_rule() -> GradingRule {
    GradingRule::Pattern {
        rubric: vec![
            RubricItem::required(
                "shape",
                [
                    Pattern::literal("skewed"),
                    Pattern::literal("symmetric"),
                    Pattern::regex(r"\buni(modal|form)\b").unwrap(),
                ],
            ),
            RubricItem::required("center", [Pattern::literal("median"), Pattern::literal("mean")]),
            RubricItem::required(
                "spread",
                [Pattern::literal("iqr"), Pattern::literal("standard deviation")],
            ),
            RubricItem::optional("outliers", [Pattern::regex(r"outliers?").unwrap()]),
        ],
        forbidden: vec![Pattern::literal("causes"), Pattern::literal("proves")],
        scoring: Default::default(),
    }
}

const LONG_ANSWER: &str = "The distribution of commute times is skewed right and unimodal, \
    with a median of about 22 minutes and an IQR of roughly 14 minutes. There are two \
    high outliers above 70 minutes, so the mean is pulled above the median.";

fn bench_rubric(c: &mut Criterion) {
    let mut group = c.benchmark_group("rubric");
    let engine = GradingEngine::default();
    let rule = describe_rule();
    let ctx = GradingContext::new();

    group.bench_function("long_excellent", |b| {
        b.iter(|| engine.evaluate(black_box(Some(LONG_ANSWER)), &rule, &ctx))
    });

    group.bench_function("short_partial", |b| {
        b.iter(|| engine.evaluate(black_box(Some("skewed, median 3")), &rule, &ctx))
    });

    group.finish();
}

fn bench_numeric_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparators");
    let engine = GradingEngine::default();
    let ctx = GradingContext::new();
    let numeric = GradingRule::numeric(1234.5, 0.01);
    let exact = GradingRule::exact("Simple Random Sample");

    group.bench_function("numeric", |b| {
        b.iter(|| engine.evaluate(black_box(Some("$1,234.50")), &numeric, &ctx))
    });

    group.bench_function("exact", |b| {
        b.iter(|| engine.evaluate(black_box(Some("  simple   random sample ")), &exact, &ctx))
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let local = GradeResult::new(Tier::Partial, "local")
        .with_items(vec!["shape".into(), "center".into()], vec!["spread".into()]);
    let ai = AiJudgement::scored(Tier::Partial, "ai");

    c.bench_function("merge_tie", |b| {
        b.iter(|| merge(black_box(&local), black_box(Some(&ai))))
    });
}

criterion_group!(benches, bench_rubric, bench_numeric_exact, bench_merge);
criterion_main!(benches);
