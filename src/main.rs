#[tokio::main]
async fn main() {
    let code = elasticalias_rs::run().await;
    std::process::exit(code);
}
