// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::Document;

/// Ten short tales used by the `load-sample` command and the tests.
///
/// Categories: infantil 3, fantastico 3, terror 2, politico 2.
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new(
            "Maria Gonzalez",
            "infantil",
            "Había una vez un pequeño dragón llamado Spark que vivía en un bosque encantado. \
             Todos los días exploraba el reino mágico buscando aventuras y nuevos amigos.",
            "2024-04-10",
        ),
        Document::new(
            "Carlos Ruiz",
            "terror",
            "La casa de la colina abandonada era el lugar más terrorífico de la zona. \
             Nadie se atrevía a acercarse después del anochecer, pues extraños sonidos \
             resonaban desde su interior.",
            "2024-07-01",
        ),
        Document::new(
            "Ana Martinez",
            "fantastico",
            "En el reino de las estrellas, donde la magia fluye como ríos de luz, \
             vivía una hechicera capaz de controlar el tiempo y el espacio.",
            "2024-05-15",
        ),
        Document::new(
            "Pedro Lopez",
            "infantil",
            "Los animales del bosque organizaron una gran fiesta para celebrar la llegada \
             de la primavera. El oso, el conejo y el zorro bailaban bajo los árboles.",
            "2024-03-20",
        ),
        Document::new(
            "Laura Sanchez",
            "terror",
            "El reloj de la torre marcaba las doce cuando las sombras comenzaron a moverse. \
             Un escalofrío recorrió mi espalda mientras escuchaba pasos acercándose.",
            "2024-08-12",
        ),
        Document::new(
            "Miguel Torres",
            "fantastico",
            "El dragón guardián del reino había despertado después de mil años. \
             Su rugido resonó por toda la tierra, anunciando el retorno de la magia antigua.",
            "2024-06-30",
        ),
        Document::new(
            "Sofia Ramirez",
            "politico",
            "El reino enfrentaba una crisis sin precedentes. Los consejeros debatían \
             sobre las nuevas leyes mientras el pueblo esperaba decisiones justas.",
            "2024-09-05",
        ),
        Document::new(
            "Diego Morales",
            "politico",
            "La asamblea del reino se reunió para discutir el tratado de paz con las \
             tierras vecinas. Era un momento crucial para la diplomacia.",
            "2024-10-18",
        ),
        Document::new(
            "Elena Vargas",
            "infantil",
            "La pequeña hada Lucía aprendió a volar por primera vez. Con sus alas \
             brillantes recorrió todo el jardín encantado lleno de flores mágicas.",
            "2024-04-25",
        ),
        Document::new(
            "Roberto Diaz",
            "fantastico",
            "En las profundidades del océano mágico existía un reino de sirenas y criaturas \
             luminosas. Sus castillos de coral brillaban con luz propia.",
            "2024-07-22",
        ),
    ]
}
