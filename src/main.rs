//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pricing_backend::{
    config::{AppState, Config},
    routes,
};

#[tokio::main]
async fn main() {
    // RUST_LOG manda; sem ele, nível info.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Configuração inválida.");

    let app_state = AppState::new(&config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = routes::router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!(
        "🚀 Servidor escutando em {} (docs em /swagger-ui)",
        listener.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| config.bind_addr.clone())
    );
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
