mod fakes;
mod retrieval_ranking;
