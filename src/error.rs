use thiserror::Error;

/// A startup resource could not be loaded. The dashboard shows the message
/// and renders nothing else.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("configuration: {0:#}")]
    Config(anyhow::Error),

    #[error("jeu de données '{path}': {cause:#}")]
    Dataset { path: String, cause: anyhow::Error },

    #[error("modèle '{path}': {cause:#}")]
    Model { path: String, cause: anyhow::Error },

    #[error("image '{path}': {cause:#}")]
    Image { path: String, cause: anyhow::Error },

    #[error("contours des régions '{source_name}': {cause:#}")]
    Boundaries { source_name: String, cause: anyhow::Error },
}

impl ResourceError {
    /// Message displayed in place of the dashboard.
    pub fn user_message(&self) -> String {
        format!(
            "❌ Fichier manquant ou erreur de chargement : {self}. \
             Veuillez exécuter le notebook `data_management.ipynb` (ou `generate_sample`) \
             et vérifier votre connexion."
        )
    }
}
