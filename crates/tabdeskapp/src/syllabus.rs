//! Built-in seed syllabus: NCERT Class 11 and Class 12 Physics, Chemistry and Mathematics.

use crate::model::Syllabus;
use once_cell::sync::Lazy;

static BUILTIN: Lazy<Syllabus> = Lazy::new(|| {
    Syllabus::new()
        .with_subject(
            "Class 11",
            "Physics",
            [
                "Physical World",
                "Units and Measurement",
                "Motion in a Straight Line",
                "Motion in a Plane",
                "Laws of Motion",
                "Work, Energy and Power",
                "System of Particles and Rotational Motion",
                "Gravitation",
                "Mechanical Properties of Solids",
                "Mechanical Properties of Fluids",
                "Thermal Properties of Matter",
                "Thermodynamics",
                "Kinetic Theory",
                "Oscillations",
                "Waves",
            ],
        )
        .with_subject(
            "Class 11",
            "Chemistry",
            [
                "Some Basic Concepts of Chemistry",
                "Structure of Atom",
                "Classification of Elements and Periodicity in Properties",
                "Chemical Bonding and Molecular Structure",
                "States of Matter",
                "Thermodynamics",
                "Equilibrium",
                "Redox Reactions",
                "Hydrogen",
                "The s-Block Elements",
                "The p-Block Elements",
                "Organic Chemistry: Some Basic Principles and Techniques",
                "Hydrocarbons",
                "Environmental Chemistry",
            ],
        )
        .with_subject(
            "Class 11",
            "Mathematics",
            [
                "Sets",
                "Relations and Functions",
                "Trigonometric Functions",
                "Principle of Mathematical Induction",
                "Complex Numbers and Quadratic Equations",
                "Linear Inequalities",
                "Permutations and Combinations",
                "Binomial Theorem",
                "Sequences and Series",
                "Straight Lines",
                "Conic Sections",
                "Introduction to Three Dimensional Geometry",
                "Limits and Derivatives",
                "Mathematical Reasoning",
                "Statistics",
                "Probability",
            ],
        )
        .with_subject(
            "Class 12",
            "Physics",
            [
                "Electric Charges and Fields",
                "Electrostatic Potential and Capacitance",
                "Current Electricity",
                "Moving Charges and Magnetism",
                "Electromagnetic Induction",
                "Alternating Current",
                "Ray Optics and Optical Instruments",
                "Wave Optics",
                "Dual Nature of Radiation and Matter",
                "Atoms",
                "Nuclei",
                "Semiconductor Electronics: Materials, Devices and Simple Circuits",
            ],
        )
        .with_subject(
            "Class 12",
            "Chemistry",
            [
                "The Solid State",
                "Solutions",
                "Electrochemistry",
                "Chemical Kinetics",
                "Surface Chemistry",
                "General Principles and Processes of Isolation of Elements",
                "The p-Block Elements",
                "The d- and f-Block Elements",
                "Coordination Compounds",
                "Haloalkanes and Haloarenes",
                "Alcohols, Phenols and Ethers",
                "Aldehydes, Ketones and Carboxylic Acids",
                "Amines",
                "Biomolecules",
                "Polymers",
                "Chemistry in Everyday Life",
            ],
        )
        .with_subject(
            "Class 12",
            "Mathematics",
            [
                "Relations and Functions",
                "Inverse Trigonometric Functions",
                "Matrices",
                "Determinants",
                "Continuity and Differentiability",
                "Applications of Derivatives",
                "Integrals",
                "Applications of Integrals",
                "Differential Equations",
                "Vector Algebra",
                "Three Dimensional Geometry",
                "Linear Programming",
                "Probability",
            ],
        )
});

pub fn builtin() -> &'static Syllabus {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_six_subjects_in_order() {
        assert_eq!(
            builtin().subjects(),
            vec![
                "Physics Class 11",
                "Chemistry Class 11",
                "Mathematics Class 11",
                "Physics Class 12",
                "Chemistry Class 12",
                "Mathematics Class 12",
            ]
        );
    }

    #[test]
    fn builtin_chapter_count() {
        assert_eq!(builtin().chapters().len(), 15 + 14 + 16 + 12 + 16 + 13);
    }
}
