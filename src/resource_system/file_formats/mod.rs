pub mod animationfile;
pub mod modelfile;
pub mod skeletonfile;
