use eframe::egui::{self, RichText, Ui};

struct Article {
    title: &'static str,
    summary: &'static str,
    source_name: &'static str,
    url: &'static str,
}

const ARTICLES: [Article; 2] = [
    Article {
        title: "Vue Générale (Le Monde)",
        summary: "L'article souligne une conjoncture très positive en 2022, avec un taux d'emploi record pour \
                  les masters (93%) et des salaires en hausse, malgré l'inflation.",
        source_name: "Le Monde",
        url: "https://www.lemonde.fr/campus/article/2023/12/13/l-insertion-professionnelle-des-jeunes-diplomes-a-atteint-un-niveau-record-en-2022_6205561_4401467.html",
    },
    Article {
        title: "Focus Social (APEC)",
        summary: "L'APEC nuance ce tableau en pointant des difficultés persistantes pour les jeunes femmes. \
                  Elles accèdent moins souvent au statut cadre et aux CDI, et un écart de salaire demeure.",
        source_name: "APEC",
        url: "https://www.apec.fr/recruteur/marche-emploi/les-etudes-de-lapec/toutes-les-etudes/insertion-des-jeunes-diplomes-2024.html",
    },
];

/// Word clouds of two press articles, side by side.
pub fn show(ui: &mut Ui, wordclouds: &[egui::TextureHandle; 2]) {
    ui.heading("Analyse Comparative de la Presse (Text Mining)");
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        for ((ui, article), texture) in cols.iter_mut().zip(&ARTICLES).zip(wordclouds) {
            ui.label(RichText::new(article.title).strong().size(16.0));
            let width = ui.available_width();
            ui.add(egui::Image::new(texture).max_width(width));
            egui::CollapsingHeader::new("Lire le résumé et voir la source")
                .id_salt(article.source_name)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal_wrapped(|ui: &mut Ui| {
                        ui.label(RichText::new("Résumé :").strong());
                        ui.label(article.summary);
                    });
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(RichText::new("Source :").strong());
                        ui.hyperlink_to(article.source_name, article.url);
                    });
                });
        }
    });
}
