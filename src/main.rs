#[actix_web::main]
async fn main() -> std::io::Result<()> {
    informes_server::run().await
}
