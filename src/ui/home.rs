use eframe::egui::{RichText, Ui};

const DERIVED_VARIABLES: [(&str, &str); 5] = [
    ("1. Grand Domaine :", "Agrégation intelligente des disciplines."),
    ("2. Indice d'Attractivité :", "Score combinant salaire (60%) et insertion (40%)."),
    ("3. Qualité de l'Emploi :", "Indice qualitatif (stabilité, statut cadre)."),
    ("4. Parité :", "Catégorisation de la part de femmes."),
    ("5. Région administrative :", "Mapping des académies vers les régions."),
];

pub fn show(ui: &mut Ui) {
    ui.heading("Objectif du Projet et Méthodologie");
    ui.label(
        "Ce dashboard est une application de la méthodologie CRISP-DM visant à analyser en profondeur \
         les débouchés des diplômés de Master en France. L'objectif est de transformer des données brutes \
         en insights stratégiques.",
    );
    ui.add_space(8.0);
    ui.label(RichText::new("Création de Variables Stratégiques").strong().size(18.0));
    for (title, text) in DERIVED_VARIABLES {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label(RichText::new("✔").color(ui.visuals().selection.bg_fill));
            ui.label(RichText::new(title).strong());
            ui.label(text);
        });
    }
}
