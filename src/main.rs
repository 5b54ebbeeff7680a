use optharness::application::{report, samples};
use tracing::Level;

// Linear samples let the factory pick; the QP needs a quadratic-capable backend
const MIP_BACKEND: &str = "AUTO";
const QP_BACKEND: &str = "CLARABEL";

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();

    let runs = [
        ("Toy integer LP", samples::toy_integer_lp(MIP_BACKEND)),
        ("Integer program", samples::integer_program(MIP_BACKEND, 5)),
        ("Matrix QP", samples::matrix_qp(QP_BACKEND, 3, 4)),
    ];

    for (title, built) in runs {
        println!("=== {} ===", title);
        println!("{}\n", report::solve_and_render(built));
    }
}
