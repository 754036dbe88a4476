//! CPU implementation of missing-value tolerant K-Means.

use rayon::prelude::*;

use crate::cluster::data::DataSet;
use crate::cluster::error::ClusterResult;
use crate::cluster::impl_generic::{Center, ClusterEngine, nearest_center};
use crate::cluster::traits::tgl_kmeans::{
    MetricKind, TglKMeansAlgorithms, TglKMeansOptions, TglKMeansResult,
};
use crate::cluster::validation::validate_centers;
use crate::runtime::cpu::CpuClient;

impl TglKMeansAlgorithms for CpuClient {
    fn tgl_kmeans(
        &self,
        data: &DataSet<'_>,
        options: &TglKMeansOptions,
    ) -> ClusterResult<TglKMeansResult> {
        self.install(|| {
            let mut engine = ClusterEngine::new(*data, options.clone())?;
            engine.run()?;
            Ok(engine.into_result())
        })
    }

    fn tgl_kmeans_predict(
        &self,
        centers: &[Vec<f64>],
        metric: MetricKind,
        data: &DataSet<'_>,
    ) -> ClusterResult<Vec<usize>> {
        validate_centers(centers, data.n_cols(), "tgl_kmeans_predict")?;
        let centers: Vec<Center> = centers
            .iter()
            .map(|c| Center::from_values(c.clone(), metric))
            .collect();
        Ok(self.install(|| {
            (0..data.n_rows())
                .into_par_iter()
                .map(|i| nearest_center(data.row(i), &centers).center)
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::data::MISSING;
    use crate::cluster::traits::tgl_kmeans::EngineState;

    fn setup() -> CpuClient {
        CpuClient::with_threads(2).unwrap()
    }

    #[test]
    fn test_tgl_kmeans_basic() {
        let client = setup();

        // Two well-separated clusters
        #[rustfmt::skip]
        let values = [
            0.0, 0.0,
            0.1, 0.1,
            0.2, 0.0,
            10.0, 10.0,
            10.1, 10.1,
            10.2, 10.0,
        ];
        let data = DataSet::new(&values, 6, 2).unwrap();
        let options = TglKMeansOptions::new(2, MetricKind::Euclid).with_seed(42);

        let result = client.tgl_kmeans(&data, &options).unwrap();
        assert_eq!(result.state, EngineState::Converged);
        assert_eq!(result.labels.len(), 6);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[1], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[4], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert_eq!(result.n_clusters(), 2);
    }

    #[test]
    fn test_tgl_kmeans_with_missing_cells() {
        let client = setup();

        // First column always observed
        #[rustfmt::skip]
        let values = [
            0.0,  MISSING,
            0.1,  0.1,
            0.2,  0.0,
            10.0, MISSING,
            10.1, 10.1,
            10.2, 10.0,
        ];
        let data = DataSet::new(&values, 6, 2).unwrap();
        let options = TglKMeansOptions::new(2, MetricKind::Euclid).with_seed(7);

        let result = client.tgl_kmeans(&data, &options).unwrap();
        assert_eq!(result.labels[0], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert_eq!(result.n_undistanceable, 0);
    }

    #[test]
    fn test_tgl_kmeans_correlation_metrics() {
        let client = setup();

        #[rustfmt::skip]
        let values = [
            1.0, 2.0, 3.0, 4.0,
            10.0, 20.0, 30.0, 40.0,
            2.0, 3.0, MISSING, 5.0,
            4.0, 3.0, 2.0, 1.0,
            40.0, 30.0, 20.0, 10.0,
            5.0, MISSING, 3.0, 2.0,
        ];
        let data = DataSet::new(&values, 6, 4).unwrap();

        for metric in [MetricKind::Pearson, MetricKind::Spearman] {
            let options = TglKMeansOptions::new(2, metric).with_seed(3);
            let result = client.tgl_kmeans(&data, &options).unwrap();
            assert!(result.state.is_terminal());
            assert!(result.labels.iter().all(|&l| l < 2));
            assert_eq!(result.n_undistanceable, 0);
        }

        // Spearman: rising rows sit at -1 from a rising center
        let centers = vec![vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 3.0, 2.0, 1.0]];
        let labels = client
            .tgl_kmeans_predict(&centers, MetricKind::Spearman, &data)
            .unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_tgl_kmeans_thread_count_independent() {
        let values: Vec<f64> = (0..300)
            .map(|i| if i % 23 == 5 { MISSING } else { ((i * 31) % 89) as f64 })
            .collect();
        let data = DataSet::new(&values, 100, 3).unwrap();
        let options = TglKMeansOptions::new(6, MetricKind::Pearson).with_seed(11);

        let single = CpuClient::with_threads(1)
            .unwrap()
            .tgl_kmeans(&data, &options)
            .unwrap();
        let multi = CpuClient::with_threads(4)
            .unwrap()
            .tgl_kmeans(&data, &options)
            .unwrap();
        assert_eq!(single, multi);
    }

    #[test]
    fn test_tgl_kmeans_invalid_k() {
        let client = setup();
        let values = [0.0, 1.0];
        let data = DataSet::new(&values, 2, 1).unwrap();
        let options = TglKMeansOptions::new(0, MetricKind::Euclid);
        assert!(client.tgl_kmeans(&data, &options).is_err());
    }

    #[test]
    fn test_tgl_kmeans_predict() {
        let client = setup();
        let values = [0.0, 0.0, 9.0, 9.5, 0.4, MISSING];
        let data = DataSet::new(&values, 3, 2).unwrap();
        let centers = vec![vec![0.0, 0.0], vec![10.0, 10.0]];

        let labels = client
            .tgl_kmeans_predict(&centers, MetricKind::Euclid, &data)
            .unwrap();
        assert_eq!(labels, vec![0, 1, 0]);

        assert!(
            client
                .tgl_kmeans_predict(&[vec![0.0]], MetricKind::Euclid, &data)
                .is_err()
        );
    }
}
